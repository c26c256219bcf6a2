// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Borrower inputs used to parameterize calculator pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanParameters {
    pub purchase_price: i64,
    pub down_payment: i64,
    pub zip_code: String,
}

impl Default for LoanParameters {
    fn default() -> Self {
        Self {
            purchase_price: 250_000,
            down_payment: 50_000,
            zip_code: "95464".to_string(),
        }
    }
}

impl LoanParameters {
    pub fn loan_amount(&self) -> i64 {
        self.purchase_price - self.down_payment
    }

    /// Zero when the purchase price is not positive.
    pub fn down_payment_percentage(&self) -> f64 {
        if self.purchase_price <= 0 {
            return 0.0;
        }
        self.down_payment as f64 / self.purchase_price as f64 * 100.0
    }

    pub fn is_valid(&self) -> bool {
        self.purchase_price > 0
            && self.down_payment >= 0
            && self.zip_code.len() == 5
            && self.zip_code.bytes().all(|b| b.is_ascii_digit())
    }
}

/// `250000` → `"$250,000"`.
pub fn format_currency(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// `20.0` → `"20.00%"`.
pub fn format_percentage(value: f64) -> String {
    format!("{value:.2}%")
}
