//! Field types and values — the closed set of scalar shapes the engine can
//! persist, with text formatting on the save side and parse functions on
//! the load side.
//!
//! Every persisted value crosses the document boundary as text. `FieldType`
//! names the destination shape so the load side can pick the right parse
//! function; `FieldValue` is the typed result handed to a holder's setter.

use chrono::{NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// FieldType
// ---------------------------------------------------------------------------

/// The declared type of a persistable field.
///
/// `Optional` wraps any other type and resolves against its inner type.
/// `Named` is the escape hatch for application-defined types — those only
/// load if a parser was registered for the name, otherwise the field is
/// silently skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Unsigned,
    Float,
    Boolean,
    Date,
    DateTime,
    Optional(Box<FieldType>),
    Named(String),
}

impl FieldType {
    /// Convenience constructor for `Optional(inner)`.
    pub fn optional(inner: FieldType) -> FieldType {
        FieldType::Optional(Box::new(inner))
    }

    /// Strip `Optional` wrappers down to the underlying type.
    pub fn unwrap_optional(&self) -> &FieldType {
        match self {
            FieldType::Optional(inner) => inner.unwrap_optional(),
            other => other,
        }
    }

    /// Stable key for parser cache lookups. Optional wrappers share the
    /// key of their inner type.
    pub fn key(&self) -> String {
        match self.unwrap_optional() {
            FieldType::Text => "text".into(),
            FieldType::Integer => "integer".into(),
            FieldType::Unsigned => "unsigned".into(),
            FieldType::Float => "float".into(),
            FieldType::Boolean => "boolean".into(),
            FieldType::Date => "date".into(),
            FieldType::DateTime => "datetime".into(),
            FieldType::Named(name) => name.clone(),
            FieldType::Optional(inner) => inner.key(),
        }
    }

    /// True if the underlying type is plain text.
    pub fn is_text(&self) -> bool {
        matches!(self.unwrap_optional(), FieldType::Text)
    }
}

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// A parsed value ready to be assigned into a holder's field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl FieldValue {
    /// Format this value as document text. Booleans are written lowercase;
    /// dates use `YYYY-MM-DD` and date-times `YYYY-MM-DD HH:MM:SS`, the
    /// same shapes the parse functions accept.
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::Unsigned(n) => n.to_string(),
            FieldValue::Float(x) => x.to_string(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Date(d) => d.format(DATE_FORMAT).to_string(),
            FieldValue::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        }
    }
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Parse functions
// ---------------------------------------------------------------------------

/// Signature shared by all parse functions: saved text in, typed value out,
/// `None` when the text does not parse as the target type.
pub type ParseFn = fn(&str) -> Option<FieldValue>;

pub fn parse_text(raw: &str) -> Option<FieldValue> {
    Some(FieldValue::Text(raw.to_string()))
}

pub fn parse_integer(raw: &str) -> Option<FieldValue> {
    raw.trim().parse::<i64>().ok().map(FieldValue::Integer)
}

pub fn parse_unsigned(raw: &str) -> Option<FieldValue> {
    raw.trim().parse::<u64>().ok().map(FieldValue::Unsigned)
}

pub fn parse_float(raw: &str) -> Option<FieldValue> {
    raw.trim().parse::<f64>().ok().map(FieldValue::Float)
}

/// Boolean text is normalized to ASCII lowercase before parsing. Documents
/// written by the previous generation of this engine store `True`/`False`;
/// the canonical exchange form is lowercase. Load-side only — the save
/// side always writes lowercase.
pub fn parse_boolean(raw: &str) -> Option<FieldValue> {
    let normalized = raw.trim().to_ascii_lowercase();
    normalized.parse::<bool>().ok().map(FieldValue::Boolean)
}

pub fn parse_date(raw: &str) -> Option<FieldValue> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .ok()
        .map(FieldValue::Date)
}

/// Accepts `YYYY-MM-DD HH:MM:SS` (the format this engine writes) and the
/// `T`-separated variant.
pub fn parse_datetime(raw: &str) -> Option<FieldValue> {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(FieldValue::DateTime)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
