// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Static acquisition: plain HTTP fetches and DOM extraction from
//! server-rendered markup. No JavaScript is executed on this path.

pub mod caption_table;
pub mod http_client;

pub use caption_table::{extract_caption_tables, TableQuote};
pub use http_client::{HtmlDocument, HttpClient, PageFetcher};
