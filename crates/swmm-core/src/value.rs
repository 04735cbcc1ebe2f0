//! Typed cell values and per-column coercion.
//!
//! The input format has one literal for "no value": the `*` token. Omitted
//! trailing tokens are padded with the same [`Value::Null`], so the two are
//! indistinguishable after coercion and both are written back as `*` (or
//! dropped when trailing).

use std::fmt;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Date literal used in TIMESERIES and related sections.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Semantic type of a section column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Double,
    Int,
    String,
    Bool,
    Date,
    Time,
}

/// One cell of a typed table.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    Text(String),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text content, or `None` for non-text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Text(s) => parse_bool(s),
            _ => None,
        }
    }

    /// Rendering used by the text emitter; `None` means "no value".
    pub fn to_token(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Text(s) if s.is_empty() || s == "*" => None,
            other => Some(other.to_string()),
        }
    }

    /// Key used by joins. Joins only ever match on populated values.
    pub fn key(&self) -> Option<String> {
        self.to_token()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "*"),
            Value::Bool(true) => write!(f, "YES"),
            Value::Bool(false) => write!(f, "NO"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::Time(t) if t.second() == 0 => write!(f, "{}", t.format("%H:%M")),
            Value::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl ColumnKind {
    /// Coerce one raw token.
    ///
    /// `*` and the empty string are "no value". Numeric columns reject
    /// malformed tokens; date, time and bool columns keep the raw text when
    /// no known format matches (simulation clock times may exceed 24h).
    pub fn coerce(self, token: &str) -> Result<Value, String> {
        let token = token.trim();
        if token.is_empty() || token == "*" {
            return Ok(Value::Null);
        }
        match self {
            ColumnKind::String => Ok(Value::Text(token.to_string())),
            ColumnKind::Double => token
                .parse::<f64>()
                .map(Value::Double)
                .map_err(|_| format!("'{token}' is not a number")),
            ColumnKind::Int => parse_int(token)
                .map(Value::Int)
                .ok_or_else(|| format!("'{token}' is not an integer")),
            ColumnKind::Bool => Ok(parse_bool(token)
                .map(Value::Bool)
                .unwrap_or_else(|| Value::Text(token.to_string()))),
            ColumnKind::Date => Ok(NaiveDate::parse_from_str(token, DATE_FORMAT)
                .map(Value::Date)
                .unwrap_or_else(|_| Value::Text(token.to_string()))),
            ColumnKind::Time => Ok(parse_time(token)
                .map(Value::Time)
                .unwrap_or_else(|| Value::Text(token.to_string()))),
        }
    }

    /// Re-coerce a value that already went through another column kind.
    pub fn coerce_value(self, value: &Value) -> Result<Value, String> {
        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),
            (ColumnKind::Double, Value::Double(_))
            | (ColumnKind::Int, Value::Int(_))
            | (ColumnKind::Bool, Value::Bool(_))
            | (ColumnKind::Date, Value::Date(_))
            | (ColumnKind::Time, Value::Time(_))
            | (ColumnKind::String, Value::Text(_)) => Ok(value.clone()),
            (ColumnKind::Double, Value::Int(v)) => Ok(Value::Double(*v as f64)),
            (kind, other) => kind.coerce(&other.to_string()),
        }
    }
}

fn parse_int(token: &str) -> Option<i64> {
    if let Ok(v) = token.parse::<i64>() {
        return Some(v);
    }
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.fract() == 0.0 && v.is_finite())
        .map(|v| v as i64)
}

fn parse_bool(token: &str) -> Option<bool> {
    match token.to_ascii_uppercase().as_str() {
        "YES" | "TRUE" | "Y" | "1" => Some(true),
        "NO" | "FALSE" | "N" | "0" => Some(false),
        _ => None,
    }
}

/// Clock time as `HH:MM:SS`, then `HH:MM`, then a bare hour.
pub fn parse_time(token: &str) -> Option<NaiveTime> {
    for format in ["%H:%M:%S", "%H:%M"] {
        if let Ok(t) = NaiveTime::parse_from_str(token, format) {
            return Some(t);
        }
    }
    token
        .parse::<u32>()
        .ok()
        .and_then(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_and_blank_are_null() {
        assert_eq!(ColumnKind::Double.coerce("*").unwrap(), Value::Null);
        assert_eq!(ColumnKind::String.coerce("").unwrap(), Value::Null);
    }

    #[test]
    fn test_numeric_columns_reject_garbage() {
        assert!(ColumnKind::Double.coerce("abc").is_err());
        assert_eq!(ColumnKind::Int.coerce("3.0").unwrap(), Value::Int(3));
        assert!(ColumnKind::Int.coerce("3.5").is_err());
    }

    #[test]
    fn test_time_fallbacks() {
        let t = |h, m, s| Value::Time(NaiveTime::from_hms_opt(h, m, s).unwrap());
        assert_eq!(ColumnKind::Time.coerce("12:30:15").unwrap(), t(12, 30, 15));
        assert_eq!(ColumnKind::Time.coerce("1:45").unwrap(), t(1, 45, 0));
        assert_eq!(ColumnKind::Time.coerce("7").unwrap(), t(7, 0, 0));
        // beyond a day stays text
        assert_eq!(
            ColumnKind::Time.coerce("36:00").unwrap(),
            Value::text("36:00")
        );
    }

    #[test]
    fn test_date_and_bool_rendering() {
        let d = ColumnKind::Date.coerce("01/15/2024").unwrap();
        assert_eq!(d.to_string(), "01/15/2024");
        assert_eq!(ColumnKind::Bool.coerce("no").unwrap().to_string(), "NO");
        assert_eq!(Value::Bool(true).to_string(), "YES");
        let t = ColumnKind::Time.coerce("0:00").unwrap();
        assert_eq!(t.to_string(), "00:00");
    }

    #[test]
    fn test_tokens() {
        assert_eq!(Value::Null.to_token(), None);
        assert_eq!(Value::Double(10.0).to_token().as_deref(), Some("10"));
        assert_eq!(Value::Double(0.015).to_token().as_deref(), Some("0.015"));
    }
}
