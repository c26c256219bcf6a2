// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Injected page scripts and the parsing of their results.
//!
//! Scripts are fixed templates; everything institution-specific (selectors,
//! loan values) is JSON-encoded into a single `cfg` argument, so no raw
//! value is ever spliced into JavaScript source.

use super::profiles::{ExtractShape, FormProfile};
use crate::error::FetchError;
use crate::extract::RawQuote;
use crate::model::LoanParameters;
use serde::Deserialize;
use serde_json::{json, Value};

const CONFIG_PLACEHOLDER: &str = "__CFG__";

const FILL_TEMPLATE: &str = r#"(function(cfg) {
  function pick(list) {
    for (const sel of list) {
      try {
        const el = document.querySelector(sel);
        if (el) return el;
      } catch (e) {}
    }
    return null;
  }
  function setValue(el, value) {
    el.focus();
    el.value = value;
    ['input', 'change', 'blur'].forEach(function(type) {
      el.dispatchEvent(new Event(type, { bubbles: true }));
    });
  }
  function findSubmit() {
    const bySelector = pick(cfg.submit);
    if (bySelector) return bySelector;
    const wanted = cfg.submitText.map(function(t) { return t.toLowerCase(); });
    if (wanted.length === 0) return null;
    const candidates = document.querySelectorAll('button, input[type="submit"], a[role="button"]');
    for (const b of candidates) {
      const text = (b.textContent || b.value || '').trim().toLowerCase();
      if (wanted.some(function(w) { return text.includes(w); })) return b;
    }
    return null;
  }
  let filled = 0;
  const missing = [];
  for (const field of cfg.fields) {
    const el = pick(field.selectors);
    if (el) {
      setValue(el, field.value);
      filled++;
    } else {
      missing.push(field.name);
    }
  }
  if (filled === 0) {
    return { status: 'FIELD_NOT_FOUND', filled: 0, missing: missing, submitted: false };
  }
  const submit = findSubmit();
  if (submit) {
    if (cfg.submitDelayMs > 0) {
      setTimeout(function() { submit.click(); }, cfg.submitDelayMs);
    } else {
      submit.click();
    }
  }
  return { status: 'FILLED', filled: filled, missing: missing, submitted: !!submit };
})(__CFG__)"#;

const EXTRACT_TEMPLATE: &str = r#"(function(cfg) {
  function textOf(el) {
    return el && el.textContent ? el.textContent.trim() : '';
  }
  function firstText(root, list) {
    for (const sel of list) {
      try {
        const t = textOf(root.querySelector(sel));
        if (t) return t;
      } catch (e) {}
    }
    return 'N/A';
  }
  function percentages() {
    const found = [];
    const pattern = /\d+\.\d+%/;
    for (const el of document.querySelectorAll('body *')) {
      if (found.length >= 10) break;
      if (el.children.length > 0) continue;
      const text = textOf(el);
      const m = text.match(pattern);
      if (m) found.push({ rate: m[0], context: text.substring(0, 80) });
    }
    return found;
  }
  const rates = [];
  let matched = null;
  if (cfg.shape === 'attributeRows') {
    let rows = [];
    for (const sel of cfg.rowSelectors) {
      try { rows = document.querySelectorAll(sel); } catch (e) { rows = []; }
      if (rows.length > 0) { matched = sel; break; }
    }
    rows.forEach(function(row) {
      const productName = row.getAttribute(cfg.nameAttr);
      if (!productName) return;
      const rate = firstText(row, cfg.rate);
      const apr = firstText(row, cfg.apr);
      const points = firstText(row, cfg.points);
      if (rate !== 'N/A' || apr !== 'N/A' || points !== 'N/A') {
        rates.push({ productName: productName.trim(), interestRate: rate, apr: apr, points: points });
      }
    });
  } else {
    for (const row of document.querySelectorAll('tr')) {
      const text = textOf(row);
      if (!text || cfg.skip.some(function(s) { return text.includes(s); })) continue;
      if (!cfg.keywords.some(function(k) { return text.includes(k); })) continue;
      const cells = row.querySelectorAll('td');
      if (cells.length < 3) continue;
      matched = 'tr';
      rates.push({
        productName: textOf(cells[0]),
        interestRate: textOf(cells[1]),
        apr: textOf(cells[2]),
        points: cells.length > 3 ? textOf(cells[3]) : 'N/A'
      });
    }
  }
  if (rates.length === 0) {
    return { rates: [], debug: { shape: cfg.shape, percentages: percentages() } };
  }
  return { rates: rates, debug: { shape: cfg.shape, matched: matched, count: rates.length } };
})(__CFG__)"#;

fn render(template: &str, cfg: &Value) -> String {
    template.replace(CONFIG_PLACEHOLDER, &cfg.to_string())
}

/// Script that fills the calculator form and clicks recalculate.
pub fn fill_script(profile: &FormProfile, params: &LoanParameters) -> String {
    let candidates = [
        ("purchase price", profile.purchase_price, params.purchase_price.to_string()),
        ("down payment", profile.down_payment, params.down_payment.to_string()),
        ("zip code", profile.zip_code, params.zip_code.clone()),
    ];
    let fields: Vec<Value> = candidates
        .into_iter()
        .filter(|(_, selectors, _)| !selectors.is_empty())
        .map(|(name, selectors, value)| json!({ "name": name, "selectors": selectors, "value": value }))
        .collect();

    let cfg = json!({
        "fields": fields,
        "submit": profile.submit,
        "submitText": profile.submit_text,
        "submitDelayMs": profile.submit_delay_ms,
    });
    render(FILL_TEMPLATE, &cfg)
}

/// Script that reads rendered rate rows.
pub fn extract_script(shape: &ExtractShape) -> String {
    let cfg = match shape {
        ExtractShape::AttributeRows {
            row_selectors,
            name_attr,
            rate,
            apr,
            points,
        } => json!({
            "shape": "attributeRows",
            "rowSelectors": row_selectors,
            "nameAttr": name_attr,
            "rate": rate,
            "apr": apr,
            "points": points,
        }),
        ExtractShape::TableRows { keywords, skip } => json!({
            "shape": "tableRows",
            "keywords": keywords,
            "skip": skip,
        }),
    };
    render(EXTRACT_TEMPLATE, &cfg)
}

/// What the fill script reported.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FillReport {
    pub status: String,
    #[serde(default)]
    pub filled: u32,
    #[serde(default)]
    pub missing: Vec<String>,
    #[serde(default)]
    pub submitted: bool,
}

/// Interpret the fill script's return value.
pub fn parse_fill(value: Value) -> Result<FillReport, FetchError> {
    let report: FillReport = serde_json::from_value(value)
        .map_err(|e| FetchError::ScriptExecution(format!("unexpected fill result: {e}")))?;
    match report.status.as_str() {
        "FILLED" => Ok(report),
        "FIELD_NOT_FOUND" => Err(FetchError::FormFieldNotFound(report.missing.join(", "))),
        other => Err(FetchError::ScriptExecution(format!(
            "fill script returned {other:?}"
        ))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScriptRow {
    product_name: Option<String>,
    interest_rate: Option<String>,
    apr: Option<String>,
    points: Option<String>,
}

/// Interpret the extract script's return value.
///
/// A missing `rates` array is an empty result, not an error: it usually
/// means the page had not finished rendering. Incomplete rows are skipped.
pub fn parse_extract(value: Value) -> Result<Vec<RawQuote>, FetchError> {
    let Value::Object(mut obj) = value else {
        return Err(FetchError::ScriptExecution(
            "extract script did not return an object".to_string(),
        ));
    };

    if let Some(diag) = obj.get("debug") {
        tracing::debug!(debug = %diag, "extraction diagnostics");
    }

    let Some(rows) = obj.remove("rates") else {
        return Ok(Vec::new());
    };
    let rows: Vec<ScriptRow> = serde_json::from_value(rows)
        .map_err(|e| FetchError::ScriptExecution(format!("malformed rates array: {e}")))?;

    let mut quotes = Vec::with_capacity(rows.len());
    for row in rows {
        let (Some(product_name), Some(interest_rate), Some(apr), Some(points)) =
            (row.product_name, row.interest_rate, row.apr, row.points)
        else {
            tracing::debug!("skipping incomplete rate row");
            continue;
        };
        if product_name.is_empty() || [&interest_rate, &apr, &points].iter().all(|v| *v == "N/A") {
            continue;
        }
        quotes.push(RawQuote {
            product_name,
            interest_rate,
            apr,
            points,
        });
    }
    Ok(quotes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::profiles::{BANK_OF_AMERICA, CHASE};

    #[test]
    fn test_fill_script_embeds_values_as_json() {
        let params = LoanParameters {
            purchase_price: 400_000,
            down_payment: 80_000,
            zip_code: "10001".to_string(),
        };
        let script = fill_script(&BANK_OF_AMERICA, &params);
        assert!(!script.contains(CONFIG_PLACEHOLDER));
        assert!(script.contains(r#""value":"400000""#));
        assert!(script.contains(r#""value":"80000""#));
        assert!(script.contains(r#""value":"10001""#));
        assert!(script.contains("#purchase-price-input-medium"));
        assert!(script.contains("dispatchEvent"));
    }

    #[test]
    fn test_fill_script_skips_fields_without_selectors() {
        let script = fill_script(&CHASE, &LoanParameters::default());
        assert!(script.contains(r#""name":"zip code""#));
        assert!(!script.contains(r#""name":"purchase price""#));
        assert!(script.contains(r#""submitDelayMs":1000"#));
    }

    #[test]
    fn test_extract_script_shapes() {
        let boa = extract_script(&BANK_OF_AMERICA.extract);
        assert!(boa.contains(r#""shape":"attributeRows""#));
        assert!(boa.contains("data-product-name"));

        let chase = extract_script(&CHASE.extract);
        assert!(chase.contains(r#""shape":"tableRows""#));
        assert!(chase.contains(r#""keywords":["Fixed","FHA","ARM","Jumbo"]"#));
    }

    #[test]
    fn test_parse_fill_statuses() {
        let ok = parse_fill(json!({"status": "FILLED", "filled": 3, "missing": [], "submitted": true}))
            .unwrap();
        assert_eq!(ok.filled, 3);
        assert!(ok.submitted);

        let missing = parse_fill(json!({"status": "FIELD_NOT_FOUND", "filled": 0, "missing": ["zip code"]}));
        assert!(matches!(missing, Err(FetchError::FormFieldNotFound(ref f)) if f == "zip code"));

        assert!(matches!(
            parse_fill(json!("ERROR: boom")),
            Err(FetchError::ScriptExecution(_))
        ));
    }

    #[test]
    fn test_parse_extract_rows() {
        let value = json!({
            "rates": [
                {"productName": "Fixed 30 Years", "interestRate": "6.125%", "apr": "6.301%", "points": "0.625"},
                {"productName": "Fixed 15 Years", "interestRate": "5.375%"},
                {"productName": "Fixed 20 Years", "interestRate": "N/A", "apr": "N/A", "points": "N/A"}
            ],
            "debug": "ok"
        });
        let quotes = parse_extract(value).unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].product_name, "Fixed 30 Years");
        assert_eq!(quotes[0].points, "0.625");
    }

    #[test]
    fn test_parse_extract_heuristic_fallback_yields_no_rows() {
        let value = json!({
            "rates": [],
            "debug": {"percentages": [{"rate": "6.125%", "context": "Today's rate 6.125%"}]}
        });
        assert!(parse_extract(value).unwrap().is_empty());
        assert!(parse_extract(json!({"debug": "loading"})).unwrap().is_empty());
        assert!(matches!(parse_extract(json!(null)), Err(FetchError::ScriptExecution(_))));
    }
}
