//! Built-in helper functions bound into every context
//!
//! - `today()`: the context's current instant
//! - `toDate(v)`: date from text or epoch milliseconds, `null` when unparsable
//! - `yearsBetween(a, b)`: whole years between two dates, 0 if either is not a date
//! - `concat(a, b)`: text concatenation, `null` as empty
//! - `len(s)`: character count of the text form, `null` as empty

use super::context::{Builtin, EvalContext};
use super::value::Value;
use super::EvalError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub(crate) const BUILTINS: &[(&str, Builtin)] = &[
    ("today", today),
    ("toDate", to_date),
    ("yearsBetween", years_between),
    ("concat", concat),
    ("len", len),
];

const MS_PER_YEAR: f64 = 1000.0 * 60.0 * 60.0 * 24.0 * 365.25;

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

fn arity<'a>(
    function: &'static str,
    args: &'a [Value],
    expected: usize,
) -> Result<&'a [Value], EvalError> {
    if args.len() == expected {
        Ok(args)
    } else {
        Err(EvalError::Arity {
            function,
            expected,
            found: args.len(),
        })
    }
}

fn today(ctx: &EvalContext, args: &[Value]) -> Result<Value, EvalError> {
    arity("today", args, 0)?;
    Ok(Value::Date(ctx.now()))
}

fn to_date(_ctx: &EvalContext, args: &[Value]) -> Result<Value, EvalError> {
    let args = arity("toDate", args, 1)?;
    Ok(parse_date(&args[0]).map(Value::Date).unwrap_or(Value::Null))
}

fn years_between(_ctx: &EvalContext, args: &[Value]) -> Result<Value, EvalError> {
    let args = arity("yearsBetween", args, 2)?;
    let (Some(a), Some(b)) = (parse_date(&args[0]), parse_date(&args[1])) else {
        return Ok(Value::Number(0.0));
    };
    let millis = (a - b).num_milliseconds().unsigned_abs() as f64;
    Ok(Value::Number((millis / MS_PER_YEAR).floor()))
}

fn concat(_ctx: &EvalContext, args: &[Value]) -> Result<Value, EvalError> {
    let args = arity("concat", args, 2)?;
    Ok(Value::Text(format!("{}{}", args[0], args[1])))
}

fn len(_ctx: &EvalContext, args: &[Value]) -> Result<Value, EvalError> {
    let args = arity("len", args, 1)?;
    Ok(Value::Number(args[0].to_text().chars().count() as f64))
}

/// Date a value denotes, if any.
///
/// Text may be RFC 3339, a plain `YYYY-MM-DD` (midnight UTC) or a date and
/// time without offset (read as UTC). Non-zero numbers are epoch
/// milliseconds. Blank text, `null`, `false` and `0` are not dates.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Date(d) => Some(*d),
        Value::Number(n) if *n != 0.0 && n.is_finite() => DateTime::from_timestamp_millis(*n as i64),
        Value::Text(s) => parse_date_text(s.trim()),
        Value::Number(_) | Value::Null | Value::Bool(_) => None,
    }
}

fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    if text.is_empty() {
        return None;
    }
    if let Ok(d) = DateTime::parse_from_rfc3339(text) {
        return Some(d.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn call(f: Builtin, args: &[Value]) -> Result<Value, EvalError> {
        f(&EvalContext::new(), args)
    }

    #[test]
    fn test_parse_date_formats() {
        let midnight = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_date(&"2020-01-01".into()), Some(midnight));
        assert_eq!(parse_date(&"2020-01-01T00:00:00Z".into()), Some(midnight));
        assert_eq!(parse_date(&"2020-01-01T02:00:00+02:00".into()), Some(midnight));
        assert_eq!(parse_date(&"2020-01-01 00:00".into()), Some(midnight));
        assert_eq!(parse_date(&"2020-01-01T00:00:00.000".into()), Some(midnight));
        assert_eq!(
            parse_date(&Value::Number(midnight.timestamp_millis() as f64)),
            Some(midnight)
        );
        assert_eq!(parse_date(&"not a date".into()), None);
        assert_eq!(parse_date(&"".into()), None);
        assert_eq!(parse_date(&Value::Null), None);
        assert_eq!(parse_date(&Value::Number(0.0)), None);
    }

    #[test]
    fn test_to_date_never_fails_on_bad_input() {
        assert_eq!(call(to_date, &["garbage".into()]).unwrap(), Value::Null);
        assert!(matches!(
            call(to_date, &["2021-06-15".into()]).unwrap(),
            Value::Date(_)
        ));
    }

    #[test]
    fn test_years_between() {
        let same = call(years_between, &["2020-01-01".into(), "2020-01-01".into()]).unwrap();
        assert_eq!(same, Value::Number(0.0));

        let forward = call(years_between, &["2000-06-15".into(), "2024-06-14".into()]).unwrap();
        let backward = call(years_between, &["2024-06-14".into(), "2000-06-15".into()]).unwrap();
        assert_eq!(forward, Value::Number(23.0));
        assert_eq!(backward, forward);

        let invalid = call(years_between, &["nope".into(), "2020-01-01".into()]).unwrap();
        assert_eq!(invalid, Value::Number(0.0));
        let invalid = call(years_between, &["2020-01-01".into(), Value::Null]).unwrap();
        assert_eq!(invalid, Value::Number(0.0));
    }

    #[test]
    fn test_today_uses_context_clock() {
        let now = Utc.with_ymd_and_hms(2030, 5, 1, 12, 0, 0).unwrap();
        let ctx = EvalContext::new().with_now(now);
        assert_eq!(today(&ctx, &[]).unwrap(), Value::Date(now));
    }

    #[test]
    fn test_concat_and_len_treat_null_as_empty() {
        assert_eq!(call(concat, &[Value::Null, "x".into()]).unwrap(), Value::from("x"));
        assert_eq!(call(concat, &["a".into(), Value::Number(1.0)]).unwrap(), Value::from("a1"));
        assert_eq!(call(len, &[Value::Null]).unwrap(), Value::Number(0.0));
        assert_eq!(call(len, &["héllo".into()]).unwrap(), Value::Number(5.0));
        assert_eq!(call(len, &[Value::Number(123.0)]).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_arity_errors() {
        assert_eq!(
            call(concat, &["a".into()]),
            Err(EvalError::Arity {
                function: "concat",
                expected: 2,
                found: 1
            })
        );
        assert!(call(today, &[Value::Null]).is_err());
    }
}
