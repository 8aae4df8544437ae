use crate::error::ExecutorError;
use configuration::Simulation;
use core_types::{Candle, Execution, OrderRequest, OrderSide};
use rust_decimal::Decimal;

/// A generic trait for an execution engine.
///
/// This trait allows the backtester to be agnostic about how fills are priced.
pub trait Executor: Send + Sync {
    /// Processes an `OrderRequest` against a candle and returns an `Execution` receipt.
    ///
    /// This function calculates the costs of the trade (fees, slippage) but crucially
    /// **does not modify the portfolio state itself**. The caller is responsible for
    /// using the returned `Execution` to update the portfolio.
    fn execute(&self, order: &OrderRequest, candle: &Candle) -> Result<Execution, ExecutorError>;
}

/// The "virtual exchange" for backtesting.
///
/// Market orders fill at the candle close moved against the trader by
/// `slippage_rate`, and pay `fee_rate` on the traded notional.
#[derive(Debug, Clone)]
pub struct SimulatedExecutor {
    fee_rate: Decimal,
    slippage_rate: Decimal,
}

impl SimulatedExecutor {
    pub fn new(params: &Simulation) -> Self {
        Self {
            fee_rate: params.fee_rate,
            slippage_rate: params.slippage_rate,
        }
    }

    /// Calculates the execution price, modeling for slippage.
    fn slipped_price(&self, side: OrderSide, close: Decimal) -> Decimal {
        match side {
            // For a buy, slippage makes the price HIGHER (worse).
            OrderSide::Buy => close * (Decimal::ONE + self.slippage_rate),
            // For a sell, slippage makes the price LOWER (worse).
            OrderSide::Sell => close * (Decimal::ONE - self.slippage_rate),
        }
    }
}

impl Executor for SimulatedExecutor {
    /// Simulates the execution of a market order.
    ///
    /// - Buy `notional`: the fee is taken out of the notional and the rest
    ///   buys `(notional - fee) / price` units, so the cash cost is exactly
    ///   `notional`.
    /// - Sell `quantity`: proceeds are `quantity * price` minus the fee.
    fn execute(&self, order: &OrderRequest, candle: &Candle) -> Result<Execution, ExecutorError> {
        if candle.close <= Decimal::ZERO {
            return Err(ExecutorError::InvalidOrder(format!(
                "cannot fill against non-positive close {}",
                candle.close
            )));
        }
        let side = order.side();
        let price = self.slipped_price(side, candle.close);

        let execution = match *order {
            OrderRequest::Buy { notional } => {
                if notional <= Decimal::ZERO {
                    return Err(ExecutorError::InvalidOrder(format!("buy notional {}", notional)));
                }
                let fee = notional * self.fee_rate;
                let gross_value = notional - fee;
                Execution {
                    side,
                    timestamp: candle.timestamp,
                    reference_price: candle.close,
                    price,
                    quantity: gross_value / price,
                    gross_value,
                    fee,
                }
            }
            OrderRequest::Sell { quantity } => {
                if quantity <= Decimal::ZERO {
                    return Err(ExecutorError::InvalidOrder(format!("sell quantity {}", quantity)));
                }
                let gross_value = quantity * price;
                Execution {
                    side,
                    timestamp: candle.timestamp,
                    reference_price: candle.close,
                    price,
                    quantity,
                    gross_value,
                    fee: gross_value * self.fee_rate,
                }
            }
        };

        tracing::trace!(?execution, "SimulatedExecutor: filled");
        Ok(execution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn candle(close: Decimal) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: Decimal::ONE,
        }
    }

    fn executor() -> SimulatedExecutor {
        SimulatedExecutor::new(&Simulation {
            fee_rate: dec!(0.001),
            slippage_rate: dec!(0.01),
            ..Simulation::default()
        })
    }

    #[test]
    fn buy_pays_slippage_and_fee_out_of_the_notional() {
        let fill = executor().execute(&OrderRequest::Buy { notional: dec!(1010) }, &candle(dec!(100))).unwrap();
        assert_eq!(fill.price, dec!(101));
        assert_eq!(fill.fee, dec!(1.01));
        assert_eq!(fill.gross_value, dec!(1008.99));
        assert_eq!(fill.quantity, dec!(9.99));
        assert_eq!(fill.cash_flow(), dec!(-1010));
    }

    #[test]
    fn sell_receives_slipped_price_minus_fee() {
        let fill = executor().execute(&OrderRequest::Sell { quantity: dec!(2) }, &candle(dec!(100))).unwrap();
        assert_eq!(fill.price, dec!(99));
        assert_eq!(fill.gross_value, dec!(198));
        assert_eq!(fill.fee, dec!(0.198));
        assert_eq!(fill.cash_flow(), dec!(197.802));
    }

    #[test]
    fn rejects_degenerate_orders() {
        let ex = executor();
        assert!(ex.execute(&OrderRequest::Buy { notional: dec!(0) }, &candle(dec!(100))).is_err());
        assert!(ex.execute(&OrderRequest::Sell { quantity: dec!(1) }, &candle(dec!(0))).is_err());
    }
}
