// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Financial institutions and the user's product opt-in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A display column offered by an institution (e.g. `apr` / "APR").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub label: String,
}

/// A lender whose published rates are tracked.
///
/// `selected_mortgage_types` is never read from or written to the catalog;
/// it always starts empty and only accepts types the institution offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Institution {
    pub name: String,
    #[serde(rename = "url")]
    pub base_url: String,
    pub mortgage_types: Vec<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(skip)]
    selected_mortgage_types: BTreeSet<String>,
}

impl Institution {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        mortgage_types: Vec<String>,
        fields: Vec<Field>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            mortgage_types,
            fields,
            selected_mortgage_types: BTreeSet::new(),
        }
    }

    /// Whether the institution offers this canonical type.
    pub fn offers(&self, mortgage_type: &str) -> bool {
        self.mortgage_types.iter().any(|t| t == mortgage_type)
    }

    /// Opt in to a product. Returns `false` (and changes nothing) when the
    /// institution does not offer it.
    pub fn select(&mut self, mortgage_type: &str) -> bool {
        if !self.offers(mortgage_type) {
            return false;
        }
        self.selected_mortgage_types.insert(mortgage_type.to_string());
        true
    }

    pub fn deselect(&mut self, mortgage_type: &str) -> bool {
        self.selected_mortgage_types.remove(mortgage_type)
    }

    /// Replace the whole selection. Types not offered are dropped.
    pub fn set_selected<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.selected_mortgage_types.clear();
        for t in types {
            self.select(t.as_ref());
        }
    }

    /// Select every offered type.
    pub fn select_all(&mut self) {
        self.selected_mortgage_types = self.mortgage_types.iter().cloned().collect();
    }

    pub fn is_selected(&self, mortgage_type: &str) -> bool {
        self.selected_mortgage_types.contains(mortgage_type)
    }

    pub fn selected_mortgage_types(&self) -> &BTreeSet<String> {
        &self.selected_mortgage_types
    }

    /// At least one product selected; only these institutions are fetched.
    pub fn is_opted_in(&self) -> bool {
        !self.selected_mortgage_types.is_empty()
    }
}
