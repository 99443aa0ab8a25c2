// 🧹 Row Normalizer
// Canonical column keys + total cell normalization + format-invariant join keys
//
// Spreadsheet exports are not schema-stable: headers change case, pick up
// stray whitespace, and numeric IDs come back as "007", "7" or 7.0 depending
// on who last saved the file. Everything downstream does exact-match lookups,
// so everything passes through here first.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// CELL VALUES
// ============================================================================

/// A raw cell as handed over by a workbook source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Bool(bool),
    Text(String),
    Empty,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        norm_text(self).is_empty()
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

/// JSON cells never fail to convert: nested structures are kept as their
/// JSON text so a stray formula object does not sink the whole sheet.
impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => CellValue::Empty,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => match n.as_f64() {
                Some(f) => CellValue::Number(f),
                None => CellValue::Text(n.to_string()),
            },
            Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

/// One sheet row: column name -> cell
pub type Row = BTreeMap<String, CellValue>;

// ============================================================================
// SCALAR NORMALIZERS
// ============================================================================

/// Canonical form of a column name: trimmed and lower-cased
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Trimmed string form of any cell. Missing/empty cells become "".
pub fn norm_text(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Number(n) => format_number(*n),
        CellValue::Text(s) => s.trim().to_string(),
    }
}

/// Join key for an identifier-bearing cell
///
/// Numeric-looking values collapse to the canonical decimal rendering of the
/// number, so "007", "7", "7.0" and 7.0 all map to "7". Anything else is
/// just the trimmed text.
pub fn join_key(value: &CellValue) -> String {
    match value {
        CellValue::Number(n) if n.is_finite() => format_number(*n),
        _ => {
            let text = norm_text(value);
            match parse_decimal(&text) {
                Some(n) => format_number(n),
                None => text,
            }
        }
    }
}

/// Parse plain decimal notation only. `f64::from_str` also accepts "inf",
/// "NaN" and friends, which are identifiers here, not numbers.
fn parse_decimal(text: &str) -> Option<f64> {
    if text.is_empty() || !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    let plain = text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !plain {
        return None;
    }

    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// ============================================================================
// ROW NORMALIZATION
// ============================================================================

/// Re-key a row with canonical column names
///
/// When two source headers collapse to the same key ("ID" and " id "), the
/// first non-empty cell in the row's sorted header order wins.
pub fn normalize_row(row: &Row) -> Row {
    let mut out = Row::new();

    for (key, value) in row {
        let key = normalize_key(key);
        match out.get(&key) {
            Some(existing) if !existing.is_empty() => {}
            _ => {
                out.insert(key, value.clone());
            }
        }
    }

    out
}

pub fn normalize_rows(rows: &[Row]) -> Vec<Row> {
    rows.iter().map(normalize_row).collect()
}

// ============================================================================
// COLUMN CHAINS
// ============================================================================

/// Priority-ordered candidate columns for one logical field
///
/// Historical spellings are tried in order; the first candidate holding a
/// non-empty value wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnChain(Vec<String>);

impl ColumnChain {
    pub fn new(candidates: &[&str]) -> Self {
        ColumnChain(candidates.iter().map(|c| normalize_key(c)).collect())
    }

    pub fn candidates(&self) -> &[String] {
        &self.0
    }

    /// First non-empty cell among the candidates of a normalized row
    pub fn value<'a>(&self, row: &'a Row) -> Option<&'a CellValue> {
        self.0
            .iter()
            .filter_map(|candidate| row.get(&normalize_key(candidate)))
            .find(|value| !value.is_empty())
    }

    pub fn text(&self, row: &Row) -> String {
        self.value(row).map(norm_text).unwrap_or_default()
    }

    pub fn key(&self, row: &Row) -> String {
        self.value(row).map(join_key).unwrap_or_default()
    }

    /// Like `text`, falling back to a sentinel when nothing is present
    pub fn text_or(&self, row: &Row, default: &str) -> String {
        let text = self.text(row);
        if text.is_empty() {
            default.to_string()
        } else {
            text
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
