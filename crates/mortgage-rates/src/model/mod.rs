// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Canonical rate model shared by every stage of the pipeline.

pub mod institution;
pub mod loan;
pub mod quote;

pub use institution::{Field, Institution};
pub use loan::{format_currency, format_percentage, LoanParameters};
pub use quote::{BankRate, RateSnapshot};
