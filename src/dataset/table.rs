use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::IgnoredAny;

use crate::dataset::schema::ColumnType;
use crate::error::{PipelineError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A single typed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    /// Source text of a well-formed JSON document, written back verbatim.
    Json(String),
}

impl Value {
    /// Parses a raw CSV cell. Empty cells are `Null` for every column type.
    /// The error carries a short reason for the loader's diagnostics.
    pub fn parse(raw: &str, kind: ColumnType) -> std::result::Result<Value, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }

        match kind {
            ColumnType::Id => Ok(Value::Text(canonical_id(trimmed))),
            ColumnType::Text => Ok(Value::Text(raw.to_string())),
            ColumnType::Integer => parse_integer(trimmed).map(Value::Integer),
            ColumnType::Decimal => match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Value::Decimal(v)),
                _ => Err(format!("'{}' is not a decimal", trimmed)),
            },
            ColumnType::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .map(Value::Date)
                .map_err(|e| format!("'{}' is not a date: {}", trimmed, e)),
            ColumnType::Timestamp => parse_timestamp(trimmed).map(Value::Timestamp),
            ColumnType::Json => serde_json::from_str::<IgnoredAny>(trimmed)
                .map(|_| Value::Json(raw.to_string()))
                .map_err(|e| format!("invalid json: {}", e)),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Join/group key. Only non-null text or integer cells can be keys.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Decimal(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

fn parse_integer(s: &str) -> std::result::Result<i64, String> {
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    // Spreadsheet exports often write whole numbers as "1998.0".
    match s.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 => Ok(v as i64),
        _ => Err(format!("'{}' is not an integer", s)),
    }
}

/// Numeric ids exported as "100.0" or "0100" key the same as "100". Any other
/// id text is kept as is.
fn canonical_id(s: &str) -> String {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let numeric = !whole.is_empty()
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b == b'0');
    match parse_integer(s) {
        Ok(v) if numeric => v.to_string(),
        _ => s.to_string(),
    }
}

fn parse_timestamp(s: &str) -> std::result::Result<NaiveDateTime, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|e| format!("'{}' is not a timestamp: {}", s, e))
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::Timestamp(ts) => f.write_str(&format_timestamp(ts)),
            Value::Json(raw) => f.write_str(raw),
        }
    }
}

/// An in-memory table: named, typed columns in file order and rows of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    kinds: Vec<ColumnType>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<(String, ColumnType)>) -> Self {
        let (columns, kinds) = columns.into_iter().unzip();
        Self {
            name: name.into(),
            columns,
            kinds,
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn kinds(&self) -> &[ColumnType] {
        &self.kinds
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width mismatch in {}", self.name);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| PipelineError::MissingColumn {
            table: self.name.clone(),
            column: name.to_string(),
        })
    }

    /// All cells of one column, in row order.
    pub fn column_values(&self, name: &str) -> Result<impl Iterator<Item = &Value> + '_> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    #[cfg(test)]
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }
}
