// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Literal rate tables for lenders whose markup is too unstable or too
//! bot-walled to scrape structurally. The tables are maintained by hand
//! from the lenders' published pages.

use super::RawQuote;

/// One hand-maintained quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRow {
    pub product: &'static str,
    pub rate: &'static str,
    pub apr: &'static str,
    pub points: &'static str,
}

const fn row(
    product: &'static str,
    rate: &'static str,
    apr: &'static str,
    points: &'static str,
) -> TableRow {
    TableRow {
        product,
        rate,
        apr,
        points,
    }
}

/// Turn table rows into raw quotes. A `"--"` points cell is shown as `"-"`.
pub fn table_quotes(rows: &[TableRow]) -> Vec<RawQuote> {
    rows.iter()
        .map(|r| RawQuote {
            product_name: r.product.to_string(),
            interest_rate: r.rate.to_string(),
            apr: r.apr.to_string(),
            points: if r.points == "--" { "-" } else { r.points }.to_string(),
        })
        .collect()
}

pub const CHARLES_SCHWAB: &[TableRow] = &[
    row("5-year ARM IAP-eligible Jumbo", "5.875%", "6.803%", "--"),
    row("7-year ARM IAP-eligible Jumbo", "5.875%", "6.628%", "--"),
    row("10-year ARM IAP-eligible Jumbo", "5.875%", "6.416%", "--"),
    row("5-year ARM interest only IAP-eligible Jumbo", "6.000%", "6.884%", "--"),
    row("7-year ARM interest only IAP-eligible Jumbo", "6.000%", "6.726%", "--"),
    row("10-year ARM interest only IAP-eligible Jumbo", "6.000%", "6.527%", "--"),
    row("15-year fixed IAP-eligible Jumbo", "5.750%", "5.798%", "--"),
    row("30-year fixed IAP-eligible Jumbo", "6.500%", "6.533%", "--"),
    row("5-year ARM Conforming Jumbo", "6.125%", "6.921%", "--"),
    row("7-year ARM Conforming Jumbo", "6.125%", "6.774%", "--"),
    row("10-year ARM Conforming Jumbo", "6.125%", "6.595%", "--"),
    row("5-year ARM interest only Conforming Jumbo", "6.375%", "7.041%", "--"),
    row("7-year ARM interest only Conforming Jumbo", "6.375%", "6.925%", "--"),
    row("10-year ARM interest only Conforming Jumbo", "6.375%", "6.778%", "--"),
    row("10-year Fixed non-IAP-eligible Conforming Jumbo", "5.750%", "5.888%", "0.125"),
    row("15-year Fixed non-IAP-eligible Conforming Jumbo", "5.875%", "5.954%", "--"),
    row("20-year Fixed non-IAP-eligible Conforming Jumbo", "5.990%", "6.053%", "-0.125"),
    row("25-year Fixed non-IAP-eligible Conforming Jumbo", "6.375%", "6.432%", "-0.125"),
    row("30-year Fixed non-IAP-eligible Conforming Jumbo", "6.375%", "6.425%", "-0.125"),
];

pub const CITI: &[TableRow] = &[
    row("30-year fixed", "6.125%", "6.301%", "0.625"),
    row("15-year fixed", "5.375%", "5.701%", "0.875"),
];

pub const HSBC_USA: &[TableRow] = &[
    row("30-year Conforming Fixed", "6.625%", "6.694%", "-"),
    row("15-year Conforming Fixed", "5.750%", "5.844%", "-"),
    row("30-year Jumbo Fixed", "6.628%", "6.679%", "-"),
    row("10/6 Jumbo ARM", "6.290%", "6.703%", "-"),
    row("7/6 Jumbo ARM", "6.170%", "6.796%", "-"),
    row("5/6 Jumbo ARM", "5.903%", "6.831%", "-"),
];

pub const NAVY_FEDERAL: &[TableRow] = &[
    row("15-year VA", "4.875%", "5.558%", "0.500"),
    row("30-year VA", "5.375%", "5.789%", "0.500"),
    row("15-year Conventional Fixed", "5.000%", "5.191%", "0.250"),
    row("15-year Jumbo Conventional Fixed", "5.500%", "5.694%", "5.694"),
    row("30-year Conventional Fixed", "5.750%", "5.889%", "0.500"),
    row("30-year Jumbo Conventional Fixed", "6.000%", "6.142%", "0.500"),
    row("30-year Homebuyer's Choice", "6.625%", "6.948%", "0.500"),
    row("30-year Jumbo Homebuyer's Choice", "7.000%", "7.331%", "0.500"),
    row("30-year Military Choice", "6.500%", "6.821%", "0.500"),
    row("30-year Jumbo Military Choice", "6.875%", "7.203%", "0.500"),
    row("3/5 Conforming ARM", "5.000%", "5.597%", "0.250"),
    row("3/5 Jumbo ARM", "5.000%", "5.597%", "0.250"),
    row("5/5 Conforming ARM", "5.250%", "5.607%", "0.250"),
    row("5/5 Jumbo ARM", "5.250%", "5.607%", "0.250"),
];

pub const US_BANK: &[TableRow] = &[
    row("30-year Conventional Fixed", "6.125%", "6.274%", "0.702"),
    row("20-year Conventional Fixed", "5.750%", "5.958%", "0.805"),
    row("15-year Conventional Fixed", "5.500%", "5.755%", "0.773"),
    row("10-year Conventional Fixed", "5.375%", "5.762%", "0.889"),
    row("10/6 Conforming ARM", "6.250%", "6.709%", "0.854"),
    row("7/6 Conforming ARM", "6.000%", "6.699%", "0.779"),
    row("10/1-year Jumbo ARM", "6.125%", "6.372%", "0.835"),
    row("7/1-year Jumbo ARM", "6.000%", "6.342%", "0.815"),
    row("5/1-year Jumbo ARM", "5.875%", "6.339%", "0.835"),
    row("30-year FHA", "6.125%", "7.016%", "0.886"),
    row("30-year VA", "5.990%", "6.368%", "0.962"),
    row("30-year Jumbo", "6.625%", "6.788%", "0.800"),
    row("20-year Jumbo", "6.500%", "6.720%", "0.850"),
    row("15-year Jumbo", "6.375%", "6.633%", "0.755"),
];

pub const WELLS_FARGO: &[TableRow] = &[
    row("15-year Fixed", "5.375%", "5.639%", "$3,200"),
    row("30-year Fixed VA", "5.625%", "5.829%", "$2,430"),
    row("30-year Fixed", "6.375%", "6.540%", "$3,200"),
];
