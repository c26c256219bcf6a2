// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Loan parameter validation: borrower text input to [`LoanParameters`].

use crate::error::ValidationError;
use crate::model::LoanParameters;
use regex::Regex;
use std::sync::OnceLock;

fn zip_pattern() -> &'static Regex {
    static ZIP: OnceLock<Regex> = OnceLock::new();
    ZIP.get_or_init(|| Regex::new(r"^[0-9]{5}$").expect("zip regex is valid"))
}

/// Drop `$`, `,` and whitespace so `"$250,000"` parses as `250000`.
fn strip_currency(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect()
}

fn parse_amount(field: &'static str, text: &str) -> Result<i64, ValidationError> {
    strip_currency(text)
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidNumber {
            field,
            input: text.to_string(),
        })
}

/// Validate and normalize borrower input.
///
/// The down payment may exceed the purchase price but must not be negative;
/// a negative down payment is reported as `InvalidNumber`.
pub fn validate(
    purchase_price_text: &str,
    down_payment_text: &str,
    zip_code_text: &str,
) -> Result<LoanParameters, ValidationError> {
    let purchase_price = parse_amount("purchase price", purchase_price_text)?;
    let down_payment = parse_amount("down payment", down_payment_text)?;

    if purchase_price <= 0 {
        return Err(ValidationError::NonPositivePrice(purchase_price));
    }
    if down_payment < 0 {
        return Err(ValidationError::InvalidNumber {
            field: "down payment",
            input: down_payment_text.to_string(),
        });
    }
    if !zip_pattern().is_match(zip_code_text) {
        return Err(ValidationError::InvalidZip(zip_code_text.to_string()));
    }

    Ok(LoanParameters {
        purchase_price,
        down_payment,
        zip_code: zip_code_text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_currency_punctuation() {
        let p = validate("$250,000", "$ 50,000", "95464").unwrap();
        assert_eq!(p.purchase_price, 250_000);
        assert_eq!(p.down_payment, 50_000);
        assert_eq!(p.zip_code, "95464");

        let p = validate(" 1,200,000 ", "0", "00501").unwrap();
        assert_eq!(p.purchase_price, 1_200_000);
        assert_eq!(p.down_payment, 0);
    }

    #[test]
    fn test_round_trips_formatted_amounts() {
        for amount in [1i64, 999, 1_000, 250_000, 7_654_321] {
            let text = crate::model::format_currency(amount);
            let p = validate(&text, &text, "12345").unwrap();
            assert_eq!(p.purchase_price, amount);
            assert_eq!(p.down_payment, amount);
        }
    }

    #[test]
    fn test_rejects_non_numeric_prices() {
        assert!(matches!(
            validate("abc", "0", "12345"),
            Err(ValidationError::InvalidNumber { field: "purchase price", .. })
        ));
        assert!(matches!(
            validate("250000", "50k", "12345"),
            Err(ValidationError::InvalidNumber { field: "down payment", .. })
        ));
        assert!(matches!(
            validate("250000.50", "0", "12345"),
            Err(ValidationError::InvalidNumber { .. })
        ));
        assert!(matches!(
            validate("", "0", "12345"),
            Err(ValidationError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_rejects_non_positive_price() {
        assert_eq!(
            validate("0", "0", "12345"),
            Err(ValidationError::NonPositivePrice(0))
        );
        assert_eq!(
            validate("-$5,000", "0", "12345"),
            Err(ValidationError::NonPositivePrice(-5000))
        );
    }

    #[test]
    fn test_rejects_negative_down_payment() {
        assert!(matches!(
            validate("250000", "-1", "12345"),
            Err(ValidationError::InvalidNumber { field: "down payment", .. })
        ));
    }

    #[test]
    fn test_down_payment_above_price_is_allowed() {
        let p = validate("100000", "150000", "12345").unwrap();
        assert_eq!(p.loan_amount(), -50_000);
    }

    #[test]
    fn test_rejects_bad_zip() {
        for zip in ["1234", "123456", "12a45", "", " 12345", "１２３４５"] {
            assert_eq!(
                validate("250000", "50000", zip),
                Err(ValidationError::InvalidZip(zip.to_string())),
                "zip {zip:?} should be rejected"
            );
        }
    }
}
