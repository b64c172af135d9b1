//! Lenient amount parsing for imported rows.
//!
//! Ledger exports arrive as JSON with amounts encoded as numbers, as strings
//! in Norwegian or US notation, or not at all. Anything that is not a finite
//! number maps to `None`; callers decide how to treat the gap.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const CURRENCY_MARKERS: [&str; 8] = ["NOK", "SEK", "DKK", "EUR", "USD", "kr", "€", "$"];
const GROUPING_CHARS: [char; 4] = [' ', '\u{a0}', '\u{202f}', '\''];

/// Parses a formatted amount such as `1 234,56 kr`, `NOK 1,234.56` or `-950`.
///
/// When both `,` and `.` occur, the last one is the decimal separator. A
/// single `,` is a decimal comma.
#[must_use]
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let (mut negative, body) = take_sign(text.trim());
    let mut body = strip_markers(body);
    let (inner_negative, rest) = take_sign(body);
    negative ^= inner_negative;
    body = strip_markers(rest);

    let compact: String = body.chars().filter(|c| !GROUPING_CHARS.contains(c)).collect();
    let normalized = normalize_separators(&compact)?;

    if !normalized.chars().any(|c| c.is_ascii_digit())
        || !normalized.chars().all(|c| c.is_ascii_digit() || c == '.')
    {
        return None;
    }

    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

/// Converts a raw JSON value into an amount.
#[must_use]
pub fn amount_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Decimal::from(i));
            }
            if let Some(u) = n.as_u64() {
                return Some(Decimal::from(u));
            }
            let text = n.to_string();
            Decimal::from_str_exact(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

/// Serde adapter for `Option<Decimal>` fields fed by untrusted input.
///
/// Use with `#[serde(default, deserialize_with = "deserialize_lenient")]`.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(amount_from_value(&value))
}

fn take_sign(s: &str) -> (bool, &str) {
    s.strip_prefix('-')
        .or_else(|| s.strip_prefix('\u{2212}'))
        .map_or((false, s), |rest| (true, rest.trim_start()))
}

fn strip_markers(mut s: &str) -> &str {
    for marker in CURRENCY_MARKERS {
        if let Some(rest) = s.strip_prefix(marker) {
            s = rest.trim_start();
        }
        if let Some(rest) = s.strip_suffix(marker) {
            s = rest.trim_end();
        }
    }
    s
}

fn normalize_separators(s: &str) -> Option<String> {
    let commas = s.matches(',').count();
    let dots = s.matches('.').count();

    let normalized = match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => {
            if commas > 1 {
                return None;
            }
            s.replace('.', "").replace(',', ".")
        }
        (Some(_), Some(_)) => {
            if dots > 1 {
                return None;
            }
            s.replace(',', "")
        }
        (Some(_), None) if commas > 1 => s.replace(',', ""),
        (Some(_), None) => s.replace(',', "."),
        (None, Some(_)) if dots > 1 => s.replace('.', ""),
        _ => s.to_string(),
    };
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[rstest]
    #[case("1234.56", dec!(1234.56))]
    #[case("1 234,56", dec!(1234.56))]
    #[case("1\u{a0}234\u{a0}567,89 kr", dec!(1234567.89))]
    #[case("NOK 1,234,567.89", dec!(1234567.89))]
    #[case("-950", dec!(-950))]
    #[case("-1 000,50 kr", dec!(-1000.50))]
    #[case("NOK -12.5", dec!(-12.5))]
    #[case("1.234.567", dec!(1234567))]
    #[case("0,01", dec!(0.01))]
    fn test_parse_amount(#[case] input: &str, #[case] expected: Decimal) {
        assert_eq!(parse_amount(input), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("NaN")]
    #[case("abc")]
    #[case("kr")]
    #[case("12abc")]
    #[case("1.2,3,4")]
    fn test_parse_amount_rejects(#[case] input: &str) {
        assert_eq!(parse_amount(input), None);
    }

    #[test]
    fn test_amount_from_value() {
        assert_eq!(amount_from_value(&json!(120000)), Some(dec!(120000)));
        assert_eq!(amount_from_value(&json!(0.1)), Some(dec!(0.1)));
        assert_eq!(amount_from_value(&json!("119 995,00")), Some(dec!(119995.00)));
        assert_eq!(amount_from_value(&json!(null)), None);
        assert_eq!(amount_from_value(&json!(true)), None);
        assert_eq!(amount_from_value(&json!("NaN")), None);
    }

    #[test]
    fn test_deserialize_lenient() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "deserialize_lenient")]
            amount: Option<Decimal>,
        }

        let row: Row = serde_json::from_value(json!({"amount": "42,50"})).unwrap();
        assert_eq!(row.amount, Some(dec!(42.50)));
        let row: Row = serde_json::from_value(json!({"amount": null})).unwrap();
        assert_eq!(row.amount, None);
        let row: Row = serde_json::from_value(json!({})).unwrap();
        assert_eq!(row.amount, None);
        let row: Row = serde_json::from_value(json!({"amount": [1, 2]})).unwrap();
        assert_eq!(row.amount, None);
    }
}
