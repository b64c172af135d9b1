//! Property-based tests for currency utilities.

use auditdesk_shared::types::{Currency, Locale};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::{format_as_currency, parse_amount, round_to_cent};

/// Strategy for signed amounts with up to four decimal places.
fn signed_amount() -> impl Strategy<Value = Decimal> {
    (-10_000_000_000i64..10_000_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn any_locale() -> impl Strategy<Value = Locale> {
    prop_oneof![Just(Locale::NbNo), Just(Locale::EnUs)]
}

fn any_currency() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::Nok),
        Just(Currency::Sek),
        Just(Currency::Eur),
        Just(Currency::Usd),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Rounding twice is the same as rounding once.
    #[test]
    fn prop_round_to_cent_idempotent(amount in signed_amount()) {
        let once = round_to_cent(amount);
        prop_assert_eq!(round_to_cent(once), once);
        prop_assert!(once.scale() <= 2);
    }

    /// Rounding never moves a value by more than half a cent.
    #[test]
    fn prop_round_to_cent_error_bound(amount in signed_amount()) {
        let diff = (round_to_cent(amount) - amount).abs();
        prop_assert!(diff <= Decimal::new(5, 3));
    }

    /// Formatted output parses back to the rounded raw value.
    #[test]
    fn prop_format_parse_round_trip(
        amount in signed_amount(),
        locale in any_locale(),
        currency in any_currency(),
    ) {
        let text = format_as_currency(amount, currency, locale);
        prop_assert_eq!(parse_amount(&text), Some(round_to_cent(amount)));
    }
}
