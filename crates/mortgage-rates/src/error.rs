// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for validation and acquisition.
//!
//! Only [`ValidationError`] ever reaches the caller of the pipeline.
//! Every [`FetchError`] is caught at the institution boundary and turned
//! into an empty contribution to the snapshot.

/// Borrower input could not be turned into [`crate::LoanParameters`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is not a whole number: {input:?}")]
    InvalidNumber { field: &'static str, input: String },

    #[error("Purchase price must be greater than zero (got {0})")]
    NonPositivePrice(i64),

    #[error("ZIP code must be exactly 5 digits: {0:?}")]
    InvalidZip(String),
}

/// A single institution's acquisition failed.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Bad URL {url:?}: {reason}")]
    BadUrl { url: String, reason: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Response body is not valid UTF-8: {0}")]
    Decode(String),

    #[error("Navigation timed out after {0}ms")]
    NavigationTimeout(u64),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("No form field matched for {0}")]
    FormFieldNotFound(String),

    #[error("Script execution failed: {0}")]
    ScriptExecution(String),

    #[error("No extraction strategy registered for {0}")]
    UnsupportedInstitution(String),

    #[error("Institution did not settle within {0}ms")]
    Timeout(u64),
}

impl FetchError {
    /// Short machine-readable kind, used in events and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::BadUrl { .. } => "bad_url",
            FetchError::Network(_) => "network",
            FetchError::Decode(_) => "decode",
            FetchError::NavigationTimeout(_) => "navigation_timeout",
            FetchError::Navigation(_) => "navigation",
            FetchError::FormFieldNotFound(_) => "form_field_not_found",
            FetchError::ScriptExecution(_) => "script_execution",
            FetchError::UnsupportedInstitution(_) => "unsupported_institution",
            FetchError::Timeout(_) => "timeout",
        }
    }

    /// Soft failures still count as a completed fetch with zero rates.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            FetchError::FormFieldNotFound(_) | FetchError::UnsupportedInstitution(_)
        )
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            let url = e.url().map(|u| u.to_string()).unwrap_or_default();
            FetchError::BadUrl {
                url,
                reason: e.to_string(),
            }
        } else if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}
