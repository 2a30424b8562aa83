//! Runtime values of the formula language

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value as Json;
use std::fmt;

/// Largest integer a double holds exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A value a formula reads or produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(DateTime<Utc>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Truthiness used by `and`, `or`, `not` and `?:`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::Date(_) => true,
        }
    }

    /// Numeric coercion for arithmetic.
    ///
    /// Blank text and `null` are 0, booleans are 0/1, dates are epoch
    /// milliseconds. Text that is not a finite number has no numeric value.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Null => Some(0.0),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => Some(*n),
            Value::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
                }
            }
            Value::Date(d) => Some(d.timestamp_millis() as f64),
        }
    }

    /// Text form used by concatenation and `len`; `null` is empty.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Strict equality: same type and same value.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            _ => false,
        }
    }

    pub fn from_json(json: &Json) -> Value {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            Json::String(s) => Value::Text(s.clone()),
            Json::Array(_) | Json::Object(_) => {
                Value::Text(crate::validation::string_form(json).into_owned())
            }
        }
    }

    /// JSON form stored back into a value set.
    ///
    /// Whole numbers become JSON integers and dates become ISO-8601 text
    /// with millisecond precision.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                Json::from(*n as i64)
            }
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Text(s) => Json::String(s.clone()),
            Value::Date(d) => Json::String(iso_string(d)),
        }
    }
}

pub(crate) fn iso_string(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn format_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        // Also prints -0 as "0".
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => format_number(*n, f),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => f.write_str(&iso_string(d)),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
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

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<&Json> for Value {
    fn from(json: &Json) -> Self {
        Value::from_json(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_number_coercion() {
        assert_eq!(Value::from("  42 ").to_number(), Some(42.0));
        assert_eq!(Value::from("").to_number(), Some(0.0));
        assert_eq!(Value::Null.to_number(), Some(0.0));
        assert_eq!(Value::Bool(true).to_number(), Some(1.0));
        assert_eq!(Value::from("abc").to_number(), None);
        assert_eq!(Value::from("inf").to_number(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Number(5.0).to_text(), "5");
        assert_eq!(Value::Number(-0.0).to_text(), "0");
        assert_eq!(Value::Number(2.5).to_text(), "2.5");
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::Bool(false).to_text(), "false");
        let d = Utc.with_ymd_and_hms(2024, 2, 29, 8, 30, 0).unwrap();
        assert_eq!(Value::Date(d).to_text(), "2024-02-29T08:30:00.000Z");
    }

    #[test]
    fn test_json_conversion() {
        assert_eq!(Value::Number(5.0).to_json(), json!(5));
        assert_eq!(Value::Number(0.25).to_json(), json!(0.25));
        assert_eq!(Value::from_json(&json!(3)), Value::Number(3.0));
        assert_eq!(Value::from_json(&json!(["a", "b"])), Value::from("a,b"));
        assert_eq!(Value::from_json(&Json::Null), Value::Null);
    }

    #[test]
    fn test_truthiness_and_equality() {
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(Value::Number(1.0).strict_eq(&Value::Number(1.0)));
        assert!(!Value::Number(1.0).strict_eq(&Value::from("1")));
        assert!(Value::Null.strict_eq(&Value::Null));
    }
}
