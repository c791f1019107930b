//! Canonical forms used for value comparison
//!
//! Two field values are equal when their canonical forms are equal. Values
//! are never rewritten: canonical forms exist only for the comparison, and
//! reports keep the values as they were supplied.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use tally_domain::field::collapse_whitespace;
use tally_domain::value::DATE_FORMAT;
use tally_domain::FieldValue;

/// Comparison form of a field value
#[derive(Debug, Clone, PartialEq)]
pub enum Canonical {
    /// Any number; `Decimal` equality ignores scale (`3000 == 3000.00`)
    Number(Decimal),
    /// Calendar day
    Date(NaiveDate),
    /// Truth value
    Bool(bool),
    /// Trimmed (and possibly case-folded) text
    Text(String),
    /// No value
    Absent,
}

/// Text normalization applied before comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextPolicy {
    /// Compare text case-insensitively
    pub fold_case: bool,
    /// Collapse internal whitespace runs to a single space
    pub collapse_whitespace: bool,
}

/// Canonicalize a value for comparison
pub fn canonicalize(value: &FieldValue, policy: TextPolicy) -> Canonical {
    match value {
        FieldValue::Integer(i) => Canonical::Number(Decimal::from(*i)),
        FieldValue::Decimal(d) => Canonical::Number(*d),
        FieldValue::Date(d) => Canonical::Date(*d),
        FieldValue::Boolean(b) => Canonical::Bool(*b),
        FieldValue::Absent => Canonical::Absent,
        FieldValue::Text(s) => canonicalize_text(s, policy),
    }
}

fn canonicalize_text(raw: &str, policy: TextPolicy) -> Canonical {
    let trimmed = raw.trim();

    if let Some(n) = parse_financial_number(trimmed) {
        return Canonical::Number(n);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Canonical::Date(date);
    }
    if let Some(b) = parse_bool_word(trimmed) {
        return Canonical::Bool(b);
    }

    let mut text = if policy.collapse_whitespace {
        collapse_whitespace(trimmed)
    } else {
        trimmed.to_string()
    };
    if policy.fold_case {
        text = text.to_lowercase();
    }
    Canonical::Text(text)
}

fn parse_bool_word(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

const CURRENCY_SYMBOLS: [char; 3] = ['$', '€', '£'];

/// Parse a financial number string:
/// - A currency symbol (`$`, `€`, `£`) may lead or trail the number
/// - Thousands separators (commas, or single spaces) must form groups of
///   three digits after a leading group of one to three
/// - Handle `(1,200)` → `-1200`
/// - Returns None if anything else remains (including `%`)
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use tally_reconciler::canonical::parse_financial_number;
///
/// assert_eq!(parse_financial_number("$3,000.00"), Some(Decimal::from(3000)));
/// assert_eq!(parse_financial_number("(1,200)"), Some(Decimal::from(-1200)));
/// assert_eq!(parse_financial_number("12%"), None);
/// assert_eq!(parse_financial_number("1,5"), None);
/// ```
pub fn parse_financial_number(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();

    // Parenthesized negatives: (123.45) → -123.45
    let (parenthesized, inner) = match trimmed.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (true, inner.trim()),
        None => (false, trimmed),
    };

    // Sign and currency may come in either order: -$1,200 or $-1,200
    let mut negative = parenthesized;
    let mut signed = false;
    let mut currency = false;
    let mut rest = inner;
    for _ in 0..2 {
        if !signed && !parenthesized {
            if let Some(r) = rest.strip_prefix('-') {
                negative = true;
                signed = true;
                rest = r;
                continue;
            }
            if let Some(r) = rest.strip_prefix('+') {
                signed = true;
                rest = r;
                continue;
            }
        }
        if !currency {
            if let Some(r) = rest.strip_prefix(CURRENCY_SYMBOLS) {
                currency = true;
                rest = r.trim_start();
            }
        }
    }
    if !currency {
        if let Some(r) = rest.strip_suffix(CURRENCY_SYMBOLS) {
            rest = r.trim_end();
        }
    }

    let (whole, fraction) = match rest.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (rest, None),
    };
    let whole = ungroup(whole)?;
    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    } else if whole.is_empty() {
        return None;
    }

    let plain = match fraction {
        Some(fraction) => format!("{}.{}", whole, fraction),
        None => whole,
    };
    let value = Decimal::from_str(&plain).ok()?;
    Some(if negative { -value } else { value })
}

/// Digits of an integer part, with valid thousands separators removed
fn ungroup(whole: &str) -> Option<String> {
    let separator = match (whole.contains(','), whole.contains(' ')) {
        (false, false) => {
            return whole.chars().all(|c| c.is_ascii_digit()).then(|| whole.to_string());
        }
        (true, false) => ',',
        (false, true) => ' ',
        (true, true) => return None,
    };

    let mut groups = whole.split(separator);
    let first = groups.next()?;
    let valid_first = (1..=3).contains(&first.len()) && first.chars().all(|c| c.is_ascii_digit());
    if !valid_first {
        return None;
    }

    let mut digits = first.to_string();
    for group in groups {
        if group.len() != 3 || !group.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        digits.push_str(group);
    }
    Some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(s: &str) -> Canonical {
        Canonical::Number(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_number_representations() {
        let policy = TextPolicy::default();
        let expected = number("3000");
        for raw in ["3000", "3,000", "$3,000.00", " 3000.0 ", "€3000", "3 000", "3000£"] {
            assert_eq!(canonicalize(&FieldValue::text(raw), policy), expected, "{}", raw);
        }
        assert_eq!(canonicalize(&FieldValue::Integer(3000), policy), expected);
    }

    #[test]
    fn test_accounting_negative() {
        assert_eq!(parse_financial_number("(1,200)"), Some(Decimal::from(-1200)));
        assert_eq!(parse_financial_number("-1200"), Some(Decimal::from(-1200)));
        assert_eq!(parse_financial_number("(-1200)"), None);
    }

    #[test]
    fn test_thousands_groups() {
        assert_eq!(parse_financial_number("1,000,000.50"), Some(Decimal::from_str("1000000.50").unwrap()));
        assert_eq!(parse_financial_number("$ 12,500"), Some(Decimal::from(12500)));
        assert_eq!(parse_financial_number("-$1,200"), Some(Decimal::from(-1200)));
        assert_eq!(parse_financial_number("$-1,200"), Some(Decimal::from(-1200)));
        assert_eq!(parse_financial_number("3000 €"), Some(Decimal::from(3000)));

        for raw in ["1,5", "1 2", "1,2345", ",100", "1,000 000", "1000,000", "1,,000", "1, 000"] {
            assert_eq!(parse_financial_number(raw), None, "{}", raw);
        }
    }

    #[test]
    fn test_malformed_groups_stay_text() {
        let policy = TextPolicy::default();
        assert_eq!(
            canonicalize(&FieldValue::text("1,5"), policy),
            Canonical::Text("1,5".to_string())
        );
        assert_ne!(
            canonicalize(&FieldValue::text("1,5"), policy),
            canonicalize(&FieldValue::Integer(15), policy)
        );
    }

    #[test]
    fn test_not_numbers() {
        for raw in ["", "$", "12%", "1.2.3", "HealthInc", "1e3", "--1", "1_000", "()", ".", "3000.", "$$3"] {
            assert_eq!(parse_financial_number(raw), None, "{}", raw);
        }
    }

    #[test]
    fn test_dates_by_calendar_day() {
        let date = NaiveDate::from_ymd_opt(2001, 4, 12).unwrap();
        let policy = TextPolicy::default();
        assert_eq!(
            canonicalize(&FieldValue::text(" 2001-04-12 "), policy),
            canonicalize(&FieldValue::Date(date), policy)
        );
    }

    #[test]
    fn test_bool_words() {
        let policy = TextPolicy::default();
        assert_eq!(canonicalize(&FieldValue::text("Yes"), policy), Canonical::Bool(true));
        assert_eq!(canonicalize(&FieldValue::text("no"), policy), Canonical::Bool(false));
        assert_eq!(canonicalize(&FieldValue::Boolean(true), policy), Canonical::Bool(true));
    }

    #[test]
    fn test_text_policy() {
        let exact = TextPolicy::default();
        let folded = TextPolicy {
            fold_case: true,
            collapse_whitespace: true,
        };

        assert_eq!(
            canonicalize(&FieldValue::text("  HealthInc "), exact),
            Canonical::Text("HealthInc".to_string())
        );
        assert_eq!(
            canonicalize(&FieldValue::text("Health   Inc"), folded),
            Canonical::Text("health inc".to_string())
        );
    }

    #[test]
    fn test_absent_and_empty_differ() {
        let policy = TextPolicy::default();
        assert_ne!(
            canonicalize(&FieldValue::Absent, policy),
            canonicalize(&FieldValue::text(""), policy)
        );
    }
}
