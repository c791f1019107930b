//! Typed field values

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// ISO calendar date format used for inference and display.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single typed value in a [`FieldMap`](crate::FieldMap).
///
/// `Absent` means "no value at all" and is distinct from `Text("")`, which is
/// a present but empty value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Free text, kept exactly as supplied
    Text(String),
    /// Whole number
    Integer(i64),
    /// Exact decimal number (scale preserved, e.g. `3000.00`)
    Decimal(Decimal),
    /// Calendar date
    Date(NaiveDate),
    /// Boolean flag
    Boolean(bool),
    /// No value
    Absent,
}

impl FieldValue {
    /// Type a raw cell value.
    ///
    /// Integers, plain decimals, ISO dates and `true`/`false` become typed
    /// values. Anything else (including formatted amounts such as `"3,000"`)
    /// stays text, verbatim. Empty input is `Text("")`, never `Absent`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_domain::FieldValue;
    ///
    /// assert_eq!(FieldValue::infer("3000"), FieldValue::Integer(3000));
    /// assert_eq!(FieldValue::infer("3,000"), FieldValue::Text("3,000".to_string()));
    /// assert_eq!(FieldValue::infer(""), FieldValue::Text(String::new()));
    /// ```
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FieldValue::Text(raw.to_string());
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return FieldValue::Integer(i);
        }
        if looks_like_plain_decimal(trimmed) {
            if let Ok(d) = Decimal::from_str(trimmed) {
                return FieldValue::Decimal(d);
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return FieldValue::Date(date);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "true" => FieldValue::Boolean(true),
            "false" => FieldValue::Boolean(false),
            _ => FieldValue::Text(raw.to_string()),
        }
    }

    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Whether this is the `Absent` marker
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    /// Borrow the text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short lowercase name of the variant
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Integer(_) => "integer",
            FieldValue::Decimal(_) => "decimal",
            FieldValue::Date(_) => "date",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Absent => "absent",
        }
    }
}

/// Digits with at most one decimal point and an optional leading sign.
///
/// `Decimal::from_str` also accepts underscores, which would turn identifiers
/// like `"1_000"` into numbers.
fn looks_like_plain_decimal(s: &str) -> bool {
    let body = s.strip_prefix(['-', '+']).unwrap_or(s);
    let mut dots = 0;
    let mut digits = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Absent => write!(f, "(absent)"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<Decimal> for FieldValue {
    fn from(d: Decimal) -> Self {
        FieldValue::Decimal(d)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(FieldValue::Absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_integer() {
        assert_eq!(FieldValue::infer("3000"), FieldValue::Integer(3000));
        assert_eq!(FieldValue::infer(" -42 "), FieldValue::Integer(-42));
    }

    #[test]
    fn test_infer_decimal_keeps_scale() {
        let value = FieldValue::infer("3000.00");
        assert_eq!(value, FieldValue::Decimal(Decimal::from_str("3000.00").unwrap()));
        assert_eq!(value.to_string(), "3000.00");
    }

    #[test]
    fn test_infer_date() {
        let value = FieldValue::infer("2023-12-31");
        assert_eq!(
            value,
            FieldValue::Date(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap())
        );
    }

    #[test]
    fn test_infer_boolean() {
        assert_eq!(FieldValue::infer("TRUE"), FieldValue::Boolean(true));
        assert_eq!(FieldValue::infer("false"), FieldValue::Boolean(false));
    }

    #[test]
    fn test_infer_formatted_amount_stays_text() {
        assert_eq!(FieldValue::infer("$3,000"), FieldValue::text("$3,000"));
        assert_eq!(FieldValue::infer("1_000"), FieldValue::text("1_000"));
    }

    #[test]
    fn test_infer_empty_is_present() {
        let value = FieldValue::infer("");
        assert!(!value.is_absent());
        assert_eq!(value.as_text(), Some(""));
    }

    #[test]
    fn test_option_conversion() {
        let none: Option<i64> = None;
        assert_eq!(FieldValue::from(none), FieldValue::Absent);
        assert_eq!(FieldValue::from(Some(5i64)), FieldValue::Integer(5));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(FieldValue::Absent.type_name(), "absent");
        assert_eq!(FieldValue::Integer(1).type_name(), "integer");
        assert_eq!(FieldValue::text("x").type_name(), "text");
    }
}
