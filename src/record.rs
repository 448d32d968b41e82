//! Records: schema-free field maps with a normalized integer identifier.
//!
//! A [`Record`] is whatever JSON object the data source returned. Fields are
//! resolved by name at runtime through [`Record::get`] and coerced to text with
//! [`Record::text`]. Identifiers are compared as [`RecordId`]s, so `3` and
//! `"3"` name the same record.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::WidgetError;

/// Name of the identifier field every record must carry.
pub const ID_FIELD: &str = "id";

/// Text substituted for a field the record does not have.
pub const MISSING_TEXT: &str = "undefined";

// ---------------------------------------------------------------------------
// RecordId
// ---------------------------------------------------------------------------

/// Integer-normalized record identifier.
///
/// Wide enough for every integer a JSON id can carry exactly; longer digit
/// runs saturate instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub i128);

impl RecordId {
    /// Normalize raw option/identifier text (`"3"`, `" 3 "`, `"3px"` all give 3).
    ///
    /// Returns `None` when the text has no leading integer; such values never
    /// match any record. Parsing stops at the first non-digit, so `"1e+21"`
    /// gives 1.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim_start();
        let (negative, digits) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let end = digits
            .bytes()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(digits.len());
        if end == 0 {
            return None;
        }
        let value = digits[..end].bytes().fold(0i128, |acc, b| {
            acc.saturating_mul(10).saturating_add(i128::from(b - b'0'))
        });
        Some(Self(if negative { -value } else { value }))
    }

    /// Normalize an identifier value through its text form.
    pub fn from_value(value: &Value) -> Option<Self> {
        Self::parse(&coerce_text(value))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One fetched record: an opaque mapping from field name to JSON value.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Wrap an existing field map.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build a record from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, WidgetError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(WidgetError::MalformedResponse(format!(
                "expected a record object, got {other}"
            ))),
        }
    }

    /// Raw value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Field value coerced to text; [`MISSING_TEXT`] when absent.
    pub fn text(&self, field: &str) -> String {
        self.get(field)
            .map(coerce_text)
            .unwrap_or_else(|| MISSING_TEXT.to_owned())
    }

    /// Normalized identifier, if the `id` field has a leading integer.
    pub fn id(&self) -> Option<RecordId> {
        self.get(ID_FIELD).and_then(RecordId::from_value)
    }

    /// Iterate `(name, value)` pairs in source order of the map.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Text form of a JSON value, as string concatenation would render it.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(number_text).unwrap_or_default()
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => coerce_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_owned(),
    }
}

/// Shortest text of a float, switching to exponent form outside
/// `1e-6 <= |f| < 1e21` (`1e+21`, `1.5e-7`).
fn number_text(f: f64) -> String {
    if f == 0.0 {
        return "0".to_owned();
    }
    let magnitude = f.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return f.to_string();
    }
    let scientific = format!("{f:e}");
    match scientific.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => scientific,
    }
}

// ---------------------------------------------------------------------------
// RecordCollection
// ---------------------------------------------------------------------------

/// Ordered, immutable list of records fetched for one mount.
///
/// Records are individually reference-counted so the selector can hand out
/// the very record it was built from.
#[derive(Debug, Clone, Default)]
pub struct RecordCollection {
    records: Vec<Arc<Record>>,
}

impl RecordCollection {
    pub fn new(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            records: records.into_iter().map(Arc::new).collect(),
        }
    }

    /// Parse a response body: a JSON array of objects, each with an `id`.
    ///
    /// Stricter than a browser list would be: a single record without an `id`
    /// rejects the whole body with `MalformedResponse`, rather than showing up
    /// as an option that can never be selected.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, WidgetError> {
        let records: Vec<Record> = serde_json::from_slice(body)
            .map_err(|e| WidgetError::MalformedResponse(e.to_string()))?;
        if let Some(index) = records.iter().position(|r| r.get(ID_FIELD).is_none()) {
            return Err(WidgetError::MalformedResponse(format!(
                "record {index} has no `{ID_FIELD}` field"
            )));
        }
        Ok(Self::new(records))
    }

    /// [`Self::from_json_slice`] for string bodies.
    pub fn from_json_str(body: &str) -> Result<Self, WidgetError> {
        Self::from_json_slice(body.as_bytes())
    }

    /// The first record whose identifier normalizes to `id`.
    pub fn find(&self, id: RecordId) -> Option<&Arc<Record>> {
        self.records.iter().find(|r| r.id() == Some(id))
    }

    /// Resolve a raw selector value back to its record.
    pub fn find_by_value(&self, raw: &str) -> Option<&Arc<Record>> {
        RecordId::parse(raw).and_then(|id| self.find(id))
    }

    pub fn first(&self) -> Option<&Arc<Record>> {
        self.records.first()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Record>> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Record>> {
        self.records.iter()
    }
}
