use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use site_locale::clock::FixedClock;
use site_locale::currency::{decimal_places, CurrencyConverter, CurrencyRateTable};
use std::sync::Arc;

fn converter() -> CurrencyConverter {
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 11, 2, 0, 0, 0).unwrap()));
    CurrencyConverter::with_snapshot(clock)
}

fn snapshot_codes() -> Vec<String> {
    CurrencyRateTable::snapshot()
        .currencies()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn minor_unit(currency: &str) -> f64 {
    10f64.powi(-(decimal_places(currency) as i32))
}

/// Converting there and back is off by at most one minor unit of `via`
/// (expressed in `home`) plus one minor unit of `home`.
fn assert_round_trip(converter: &CurrencyConverter, amount: f64, home: &str, via: &str) -> Result<(), TestCaseError> {
    let table = converter.table();
    let (home_rate, via_rate) = (table.rate(home).unwrap(), table.rate(via).unwrap());

    let there = converter.convert(amount, home, via);
    let back = converter.convert(there, via, home);

    let tolerance = minor_unit(via) * home_rate / via_rate + minor_unit(home) + amount.abs() * 1e-12;
    prop_assert!(
        (back - amount).abs() <= tolerance,
        "{} {} -> {} {} -> {} {} (tolerance {})",
        amount,
        home,
        there,
        via,
        back,
        home,
        tolerance
    );
    Ok(())
}

proptest! {
    #[test]
    fn conversion_round_trip_between_snapshot_currencies(
        amount in 0.0f64..1.0e6,
        home in 0usize..38,
        via in 0usize..38,
    ) {
        let codes = snapshot_codes();
        assert_round_trip(&converter(), amount, &codes[home], &codes[via])?;
    }

    #[test]
    fn conversion_round_trip_through_zero_decimal_currency(
        amount in 0.0f64..1.0e6,
        home in 0usize..38,
        via in prop::sample::select(vec!["JPY", "KRW", "VND", "IDR"]),
    ) {
        prop_assert_eq!(decimal_places(via), 0);
        let codes = snapshot_codes();
        assert_round_trip(&converter(), amount, &codes[home], via)?;
    }

    #[test]
    fn conversion_to_same_currency_is_rounding_only(amount in -1.0e9f64..1.0e9, index in 0usize..38) {
        let codes = snapshot_codes();
        let code = &codes[index];
        let converted = converter().convert(amount, code, code);
        prop_assert!((converted - amount).abs() <= minor_unit(code) / 2.0 + amount.abs() * 1e-12);
    }
}
