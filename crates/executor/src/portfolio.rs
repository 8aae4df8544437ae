use crate::error::ExecutorError;
use crate::position::DcaPosition;
use core_types::{ExitReason, Execution, OrderSide, Trade};
use rust_decimal::Decimal;

/// Manages the state of a single-symbol trading account: cash plus at most
/// one open DCA position.
///
/// Its sole responsibility is to accurately reflect the current state based
/// on trade executions.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub cash: Decimal,
    position: Option<DcaPosition>,
}

impl Portfolio {
    /// Creates a new `Portfolio` with a given amount of starting capital.
    pub fn new(initial_capital: Decimal) -> Self {
        Self {
            cash: initial_capital,
            position: None,
        }
    }

    pub fn position(&self) -> Option<&DcaPosition> {
        self.position.as_ref()
    }

    /// Opens a new position from a buy fill.
    pub fn open_position(
        &mut self,
        execution: &Execution,
        max_lots: u32,
        lot_interval_pct: Decimal,
    ) -> Result<&DcaPosition, ExecutorError> {
        if self.position.is_some() {
            return Err(ExecutorError::PositionAlreadyOpen);
        }
        self.apply_cash(execution, OrderSide::Buy)?;

        let position = DcaPosition::open(
            execution.price,
            execution.quantity,
            execution.timestamp,
            max_lots,
            lot_interval_pct,
        );
        Ok(self.position.insert(position))
    }

    /// Adds a buy fill as the next lot of the open position.
    pub fn add_lot(&mut self, execution: &Execution) -> Result<&DcaPosition, ExecutorError> {
        if self.position.is_none() {
            return Err(ExecutorError::PositionNotFound("add a lot to"));
        }
        self.apply_cash(execution, OrderSide::Buy)?;

        let position = self
            .position
            .as_mut()
            .ok_or(ExecutorError::PositionNotFound("add a lot to"))?;
        position.add_lot(execution.price, execution.quantity, execution.timestamp);
        Ok(position)
    }

    /// Closes the open position with a full-quantity sell fill.
    pub fn close_position(
        &mut self,
        execution: &Execution,
        reason: ExitReason,
    ) -> Result<Trade, ExecutorError> {
        let position = self
            .position
            .take()
            .ok_or(ExecutorError::PositionNotFound("close"))?;
        if let Err(e) = self.apply_cash(execution, OrderSide::Sell) {
            self.position = Some(position);
            return Err(e);
        }
        Ok(position.close(execution, reason))
    }

    /// Calculates the total equity of the portfolio at a given market price.
    /// Equity = Cash + Market Value of the open position.
    pub fn total_equity(&self, mark_price: Decimal) -> Decimal {
        self.cash
            + self
                .position
                .as_ref()
                .map_or(Decimal::ZERO, |position| position.market_value(mark_price))
    }

    fn apply_cash(&mut self, execution: &Execution, expected: OrderSide) -> Result<(), ExecutorError> {
        if execution.side != expected {
            return Err(ExecutorError::SideMismatch(format!("{:?}", execution.side)));
        }
        let cash_after = self.cash + execution.cash_flow();
        if cash_after.is_sign_negative() {
            return Err(ExecutorError::InsufficientCash {
                required: (-execution.cash_flow()).to_string(),
                available: self.cash.to_string(),
            });
        }
        self.cash = cash_after;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn fill(side: OrderSide, price: Decimal, quantity: Decimal) -> Execution {
        Execution {
            side,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            reference_price: price,
            price,
            quantity,
            gross_value: price * quantity,
            fee: Decimal::ZERO,
        }
    }

    #[test]
    fn tracks_cash_through_a_position_lifecycle() {
        let mut portfolio = Portfolio::new(dec!(1000));
        portfolio.open_position(&fill(OrderSide::Buy, dec!(100), dec!(2)), 3, dec!(10)).unwrap();
        assert_eq!(portfolio.cash, dec!(800));
        assert_eq!(portfolio.total_equity(dec!(110)), dec!(1020));

        portfolio.add_lot(&fill(OrderSide::Buy, dec!(90), dec!(2))).unwrap();
        assert_eq!(portfolio.cash, dec!(620));
        assert_eq!(portfolio.position().unwrap().lot_count(), 2);

        let trade = portfolio
            .close_position(&fill(OrderSide::Sell, dec!(100), dec!(4)), ExitReason::Profit)
            .unwrap();
        assert_eq!(trade.pnl, dec!(20));
        assert_eq!(portfolio.cash, dec!(1020));
        assert!(portfolio.position().is_none());
        assert_eq!(portfolio.total_equity(dec!(1)), dec!(1020));
    }

    #[test]
    fn rejects_operations_on_missing_or_duplicate_positions() {
        let mut portfolio = Portfolio::new(dec!(1000));
        assert!(matches!(
            portfolio.add_lot(&fill(OrderSide::Buy, dec!(100), dec!(1))),
            Err(ExecutorError::PositionNotFound(_))
        ));
        assert!(matches!(
            portfolio.close_position(&fill(OrderSide::Sell, dec!(100), dec!(1)), ExitReason::Forced),
            Err(ExecutorError::PositionNotFound(_))
        ));

        portfolio.open_position(&fill(OrderSide::Buy, dec!(100), dec!(1)), 2, dec!(10)).unwrap();
        assert!(matches!(
            portfolio.open_position(&fill(OrderSide::Buy, dec!(100), dec!(1)), 2, dec!(10)),
            Err(ExecutorError::PositionAlreadyOpen)
        ));
    }

    #[test]
    fn refuses_to_overdraw_cash() {
        let mut portfolio = Portfolio::new(dec!(100));
        let result = portfolio.open_position(&fill(OrderSide::Buy, dec!(100), dec!(2)), 2, dec!(10));
        assert!(matches!(result, Err(ExecutorError::InsufficientCash { .. })));
        assert_eq!(portfolio.cash, dec!(100));
        assert!(portfolio.position().is_none());
    }
}
