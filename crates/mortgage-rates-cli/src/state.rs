// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! The last snapshot, saved between runs so the freshness window applies
//! across invocations. A saved snapshot is only reused for the same loan
//! parameters and selection.

use anyhow::{Context, Result};
use mortgage_rates::{Institution, LoanParameters, RateSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub type Selection = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Serialize, Deserialize)]
pub struct SavedSnapshot {
    pub params: LoanParameters,
    pub selection: Selection,
    pub snapshot: RateSnapshot,
}

pub fn selection_of(institutions: &[Institution]) -> Selection {
    institutions
        .iter()
        .filter(|i| i.is_opted_in())
        .map(|i| (i.name.clone(), i.selected_mortgage_types().clone()))
        .collect()
}

/// The saved snapshot, if one exists for exactly this request.
pub fn load_matching(path: &Path, params: &LoanParameters, selection: &Selection) -> Option<RateSnapshot> {
    let json = std::fs::read_to_string(path).ok()?;
    let saved: SavedSnapshot = match serde_json::from_str(&json) {
        Ok(saved) => saved,
        Err(e) => {
            tracing::debug!(path = %path.display(), "ignoring unreadable saved snapshot: {e}");
            return None;
        }
    };
    (saved.params == *params && saved.selection == *selection).then_some(saved.snapshot)
}

pub fn save(path: &Path, saved: &SavedSnapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(saved)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
