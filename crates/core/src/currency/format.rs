//! Locale-aware amount formatting.

use auditdesk_shared::types::{Currency, Locale};
use rust_decimal::Decimal;

use super::rounding::round_to_cent;

const NB_GROUP_SEPARATOR: char = '\u{a0}';

/// Formats an amount for display, rounded to the cent.
///
/// - `nb-NO`: `1 234 567,89 kr` (non-breaking spaces)
/// - `en-US`: `NOK 1,234,567.89`
///
/// Negative amounts are prefixed with `-`. The output parses back to the
/// rounded value with [`parse_amount`](super::parse_amount).
#[must_use]
pub fn format_as_currency(amount: Decimal, currency: Currency, locale: Locale) -> String {
    let rounded = round_to_cent(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = format!("{:.2}", rounded.abs());
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    match locale {
        Locale::NbNo => format!(
            "{sign}{},{fraction}{NB_GROUP_SEPARATOR}{}",
            group_digits(integer, NB_GROUP_SEPARATOR),
            currency.local_symbol()
        ),
        Locale::EnUs => format!(
            "{sign}{} {}.{fraction}",
            currency.code(),
            group_digits(integer, ',')
        ),
    }
}

fn group_digits(integer: &str, separator: char) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_nb_no() {
        assert_eq!(
            format_as_currency(dec!(1234567.891), Currency::Nok, Locale::NbNo),
            "1\u{a0}234\u{a0}567,89\u{a0}kr"
        );
        assert_eq!(
            format_as_currency(dec!(5), Currency::Nok, Locale::NbNo),
            "5,00\u{a0}kr"
        );
        assert_eq!(
            format_as_currency(dec!(-1000), Currency::Nok, Locale::NbNo),
            "-1\u{a0}000,00\u{a0}kr"
        );
    }

    #[test]
    fn test_format_en_us() {
        assert_eq!(
            format_as_currency(dec!(1234567.89), Currency::Nok, Locale::EnUs),
            "NOK 1,234,567.89"
        );
        assert_eq!(
            format_as_currency(dec!(-0.5), Currency::Eur, Locale::EnUs),
            "-EUR 0.50"
        );
        assert_eq!(
            format_as_currency(dec!(999), Currency::Usd, Locale::EnUs),
            "USD 999.00"
        );
    }

    #[test]
    fn test_format_negative_rounding_to_zero_has_no_sign() {
        assert_eq!(
            format_as_currency(dec!(-0.001), Currency::Nok, Locale::EnUs),
            "NOK 0.00"
        );
    }
}
