use chrono::{DateTime, Utc};
use core_types::{ExitReason, Execution, Lot, OrderSide, Trade};
use rust_decimal::Decimal;
use serde::Serialize;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// An open long position built from one or more DCA lots.
///
/// The position exists only while it holds at least one lot: `open` creates
/// it with lot #1 and `close` consumes it into a [`Trade`]. Adding lots
/// beyond `max_lots` is a programming error and panics.
///
/// Lot trigger prices are anchored to the first lot's price and evenly
/// spaced by `lot_interval_pct`: with a first fill at 100 and a 10%
/// interval, lots 2, 3, 4 trigger at 90, 80, 70.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DcaPosition {
    lots: Vec<Lot>,
    max_lots: u32,
    lot_interval_pct: Decimal,
}

impl DcaPosition {
    /// Opens a position with its first lot.
    ///
    /// # Panics
    ///
    /// If `max_lots` is zero or the price or quantity is not positive.
    pub fn open(
        price: Decimal,
        quantity: Decimal,
        timestamp: DateTime<Utc>,
        max_lots: u32,
        lot_interval_pct: Decimal,
    ) -> Self {
        assert!(max_lots >= 1, "a DCA position needs at least one lot");
        assert!(
            price > Decimal::ZERO && quantity > Decimal::ZERO,
            "lot price and quantity must be positive"
        );

        Self {
            lots: vec![Lot { price, quantity, timestamp, sequence: 1 }],
            max_lots,
            lot_interval_pct,
        }
    }

    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    pub fn lot_count(&self) -> u32 {
        self.lots.len() as u32
    }

    pub fn max_lots(&self) -> u32 {
        self.max_lots
    }

    pub fn is_fully_built(&self) -> bool {
        self.lot_count() >= self.max_lots
    }

    pub fn first_lot_price(&self) -> Decimal {
        self.lots[0].price
    }

    pub fn total_quantity(&self) -> Decimal {
        self.lots.iter().map(|lot| lot.quantity).sum()
    }

    pub fn total_cost(&self) -> Decimal {
        self.lots.iter().map(Lot::cost).sum()
    }

    /// `Σ(price·qty) / Σ(qty)` over all lots.
    pub fn average_price(&self) -> Decimal {
        self.total_cost() / self.total_quantity()
    }

    /// Relative distance of `price` from the average entry, in percent.
    pub fn return_pct(&self, price: Decimal) -> Decimal {
        let average = self.average_price();
        (price - average) / average * HUNDRED
    }

    pub fn market_value(&self, price: Decimal) -> Decimal {
        self.total_quantity() * price
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.lots[0].timestamp
    }

    /// Price at or below which the next lot is bought, or `None` once every
    /// lot has been placed.
    pub fn next_trigger_price(&self) -> Option<Decimal> {
        if self.is_fully_built() {
            return None;
        }
        let steps = Decimal::from(self.lot_count());
        Some(self.first_lot_price() * (Decimal::ONE - steps * self.lot_interval_pct / HUNDRED))
    }

    pub fn should_add_lot(&self, current_price: Decimal) -> bool {
        self.next_trigger_price()
            .is_some_and(|trigger| current_price <= trigger)
    }

    /// Appends the next lot.
    ///
    /// # Panics
    ///
    /// If the position already holds `max_lots` lots.
    pub fn add_lot(&mut self, price: Decimal, quantity: Decimal, timestamp: DateTime<Utc>) {
        assert!(
            !self.is_fully_built(),
            "cannot add lot {} to a position limited to {} lots",
            self.lot_count() + 1,
            self.max_lots
        );
        assert!(
            price > Decimal::ZERO && quantity > Decimal::ZERO,
            "lot price and quantity must be positive"
        );

        let sequence = self.lot_count() + 1;
        self.lots.push(Lot { price, quantity, timestamp, sequence });
    }

    /// Exit decision at `current_price`.
    ///
    /// The profit target applies at any lot count. The stop loss is only
    /// considered once every lot has been placed.
    pub fn should_close(
        &self,
        current_price: Decimal,
        profit_target_pct: Decimal,
        stop_loss_pct: Decimal,
    ) -> Option<ExitReason> {
        let change = self.return_pct(current_price);
        if change >= profit_target_pct {
            Some(ExitReason::Profit)
        } else if self.is_fully_built() && change <= stop_loss_pct {
            Some(ExitReason::Loss)
        } else {
            None
        }
    }

    /// Closes the whole position with a sell fill and returns the resulting trade.
    ///
    /// `pnl = gross sale value − sell fee − Σ(lot.price·lot.qty)`.
    ///
    /// # Panics
    ///
    /// If `exit` is not a sell of the full position quantity.
    pub fn close(self, exit: &Execution, reason: ExitReason) -> Trade {
        assert_eq!(exit.side, OrderSide::Sell, "positions are closed with a sell");
        assert_eq!(exit.quantity, self.total_quantity(), "positions are closed in full");

        let total_cost = self.total_cost();
        let pnl = exit.gross_value - exit.fee - total_cost;
        let pnl_pct = pnl / total_cost * HUNDRED;

        Trade {
            lots: self.lots,
            exit_price: exit.price,
            exit_timestamp: exit.timestamp,
            exit_reason: reason,
            pnl,
            pnl_pct,
        }
    }
}
