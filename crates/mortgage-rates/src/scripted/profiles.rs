// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Form and extraction profiles for calculator-driven rate pages.
//!
//! Selector lists are ordered by priority; the first candidate that matches
//! wins. They are plain data so a site tweak is a one-line change.

/// Where an institution's rate calculator keeps its inputs, and how the
/// rendered rates are laid out afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormProfile {
    pub purchase_price: &'static [&'static str],
    pub down_payment: &'static [&'static str],
    pub zip_code: &'static [&'static str],
    /// Recalculate control, by selector.
    pub submit: &'static [&'static str],
    /// Recalculate control, by visible button text (case-insensitive).
    pub submit_text: &'static [&'static str],
    /// Delay between filling the last field and clicking submit.
    pub submit_delay_ms: u64,
    pub extract: ExtractShape,
}

/// Layout of the rendered rate rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractShape {
    /// One element per product carrying its name in an attribute, with the
    /// rate, APR and points in child elements.
    AttributeRows {
        row_selectors: &'static [&'static str],
        name_attr: &'static str,
        rate: &'static [&'static str],
        apr: &'static [&'static str],
        points: &'static [&'static str],
    },
    /// Plain `<tr>` rows: product, rate, APR in the first three cells.
    /// Only rows mentioning a keyword are read; rows containing a `skip`
    /// phrase are headers.
    TableRows {
        keywords: &'static [&'static str],
        skip: &'static [&'static str],
    },
}

pub const BANK_OF_AMERICA: FormProfile = FormProfile {
    purchase_price: &["#purchase-price-input-medium", "input[name='purchasePrice']"],
    down_payment: &["#down-payment-input-medium", "input[name='downPayment']"],
    zip_code: &["#zip-code-input-medium", "input[name='zipCode']"],
    submit: &["#update-button-medium", "[id*='update']"],
    submit_text: &["update", "calculate"],
    submit_delay_ms: 0,
    extract: ExtractShape::AttributeRows {
        row_selectors: &[
            "div.row[data-product-name]",
            "[data-product-name]",
            ".mortgage-rate-row",
            ".rate-row",
            "tr[data-product-name]",
        ],
        name_attr: "data-product-name",
        rate: &[
            "p.partial-rate span.update-partial",
            ".partial-rate .update-partial",
            "[class*='rate'] [class*='update']",
            ".rate-value",
            ".interest-rate",
        ],
        apr: &[
            "p.partial-apr span.update-partial",
            ".partial-apr .update-partial",
            "[class*='apr'] [class*='update']",
            ".apr-value",
        ],
        points: &[
            "p.partial-points span.update-partial",
            ".partial-points .update-partial",
            "[class*='points'] [class*='update']",
            ".points-value",
        ],
    },
};

pub const CHASE: FormProfile = FormProfile {
    purchase_price: &[],
    down_payment: &[],
    zip_code: &[
        "input[name='ZIP code']",
        "input[aria-label='ZIP code']",
        "input[pattern='[0-9]{5}']",
        "input[maxlength='5']",
        "input[autocomplete='postal-code']",
    ],
    submit: &["button[data-pt-name='sm_next']"],
    submit_text: &["see rates"],
    submit_delay_ms: 1000,
    extract: ExtractShape::TableRows {
        keywords: &["Fixed", "FHA", "ARM", "Jumbo"],
        skip: &["Product", "Interest Rate", "APR"],
    },
};
