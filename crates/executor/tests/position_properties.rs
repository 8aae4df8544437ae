use chrono::{Duration, TimeZone, Utc};
use core_types::ExitReason;
use executor::DcaPosition;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn decimal(cents: u32) -> Decimal {
    Decimal::new(cents as i64, 2)
}

proptest! {
    #[test]
    fn average_price_matches_independent_recomputation(
        lots in prop::collection::vec((1u32..1_000_000, 1u32..100_000), 1..12),
        max_lots in 1u32..12,
    ) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let (first_price, first_qty) = lots[0];
        let mut position = DcaPosition::open(
            decimal(first_price), decimal(first_qty), start, max_lots, Decimal::from(5),
        );

        for (i, (price, qty)) in lots.iter().enumerate().skip(1) {
            if position.is_fully_built() {
                prop_assert!(!position.should_add_lot(Decimal::ONE));
                break;
            }
            position.add_lot(decimal(*price), decimal(*qty), start + Duration::hours(i as i64));
        }

        prop_assert!(position.lot_count() <= max_lots);

        let placed = &lots[..position.lot_count() as usize];
        let cost: Decimal = placed.iter().map(|(p, q)| decimal(*p) * decimal(*q)).sum();
        let quantity: Decimal = placed.iter().map(|(_, q)| decimal(*q)).sum();
        prop_assert_eq!(position.average_price(), cost / quantity);
        prop_assert_eq!(position.total_cost(), cost);
    }

    #[test]
    fn partial_positions_never_stop_out(
        first in 1_000u32..1_000_000,
        drop_pct in 1u32..100,
        extra_lots in 0u32..4,
    ) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let price = decimal(first);
        let mut position = DcaPosition::open(price, Decimal::ONE, start, 6, Decimal::from(10));
        for i in 0..extra_lots {
            position.add_lot(price, Decimal::ONE, start + Duration::hours(i as i64 + 1));
        }

        let crashed = price * Decimal::from(100 - drop_pct) / Decimal::ONE_HUNDRED;
        prop_assert_ne!(
            position.should_close(crashed, Decimal::from(5), Decimal::from(-7)),
            Some(ExitReason::Loss)
        );
    }
}
