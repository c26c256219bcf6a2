// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Mortgage rate tracker: multi-source rate acquisition and normalization.
//!
//! Institutions publish rates either in server-rendered markup or behind a
//! client-side calculator. This crate fetches both kinds, maps each
//! institution's product vocabulary onto canonical mortgage types, and
//! merges the per-institution results into one [`RateSnapshot`].

pub mod acquisition;
pub mod aggregate;
pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod history;
pub mod model;
pub mod normalize;
pub mod registry;
pub mod renderer;
pub mod scripted;
pub mod validate;

pub use aggregate::Aggregator;
pub use config::{load_catalog, TrackerConfig};
pub use error::{FetchError, ValidationError};
pub use model::{BankRate, Field, Institution, LoanParameters, RateSnapshot};
pub use registry::{normalize, FetchStrategy, Strategy, StrategyRegistry};
pub use validate::validate;
