use analytics::AnalyticsEngine;
use chrono::{Duration, TimeZone, Utc};
use core_types::{EquitySample, Interval};
use proptest::prelude::*;
use rust_decimal::Decimal;

proptest! {
    #[test]
    fn drawdown_stays_between_minus_100_and_zero(values in prop::collection::vec(1u64..10_000_000, 1..200)) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let curve: Vec<EquitySample> = values
            .iter()
            .enumerate()
            .map(|(i, v)| EquitySample {
                timestamp: start + Duration::minutes(i as i64),
                portfolio_value: Decimal::new(*v as i64, 2),
            })
            .collect();

        let initial = curve[0].portfolio_value;
        let last = curve[curve.len() - 1].portfolio_value;
        let report = AnalyticsEngine::new()
            .calculate(&[], &curve, initial, last, Interval::OneMinute)
            .unwrap();

        prop_assert!(report.max_drawdown_pct <= Decimal::ZERO);
        prop_assert!(report.max_drawdown_pct > Decimal::from(-100));
        prop_assert!(report.max_drawdown >= Decimal::ZERO);

        let rises_only = values.windows(2).all(|w| w[1] >= w[0]);
        if rises_only {
            prop_assert_eq!(report.max_drawdown_pct, Decimal::ZERO);
        }
    }
}
