use crate::enums::{ExitReason, OrderSide};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One OHLCV bar. Candles are immutable once produced and a series is
/// expected to have strictly increasing timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// A single DCA entry fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    /// Fill price, slippage included.
    pub price: Decimal,
    pub quantity: Decimal,
    pub timestamp: DateTime<Utc>,
    /// 1-based position of this lot within its position.
    pub sequence: u32,
}

impl Lot {
    pub fn cost(&self) -> Decimal {
        self.price * self.quantity
    }
}

/// A closed position. Created exactly once, when the position is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub lots: Vec<Lot>,
    pub exit_price: Decimal,
    pub exit_timestamp: DateTime<Utc>,
    pub exit_reason: ExitReason,
    pub pnl: Decimal,
    pub pnl_pct: Decimal,
}

impl Trade {
    pub fn lot_count(&self) -> usize {
        self.lots.len()
    }

    pub fn total_quantity(&self) -> Decimal {
        self.lots.iter().map(|lot| lot.quantity).sum()
    }

    pub fn total_cost(&self) -> Decimal {
        self.lots.iter().map(Lot::cost).sum()
    }

    /// Quantity-weighted average entry price. Zero for a trade without lots.
    pub fn average_price(&self) -> Decimal {
        let quantity = self.total_quantity();
        if quantity.is_zero() {
            return Decimal::ZERO;
        }
        self.total_cost() / quantity
    }

    pub fn entry_timestamp(&self) -> Option<DateTime<Utc>> {
        self.lots.first().map(|lot| lot.timestamp)
    }

    /// Time from the first lot to the exit.
    pub fn holding_period(&self) -> Duration {
        self.entry_timestamp()
            .map(|entry| self.exit_timestamp - entry)
            .unwrap_or_else(Duration::zero)
    }

    pub fn is_win(&self) -> bool {
        self.pnl > Decimal::ZERO
    }
}

/// Portfolio value observed at the close of one candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquitySample {
    pub timestamp: DateTime<Utc>,
    pub portfolio_value: Decimal,
}

/// A market order sent to an executor.
///
/// Buys are sized in quote currency (the lot budget, fee included); sells are
/// sized in base quantity because a position is always closed in full.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderRequest {
    Buy { notional: Decimal },
    Sell { quantity: Decimal },
}

impl OrderRequest {
    pub fn side(&self) -> OrderSide {
        match self {
            OrderRequest::Buy { .. } => OrderSide::Buy,
            OrderRequest::Sell { .. } => OrderSide::Sell,
        }
    }
}

/// The receipt of a simulated fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub side: OrderSide,
    pub timestamp: DateTime<Utc>,
    /// The candle close the fill was derived from.
    pub reference_price: Decimal,
    /// The fill price after slippage.
    pub price: Decimal,
    pub quantity: Decimal,
    /// Traded value excluding the fee.
    pub gross_value: Decimal,
    pub fee: Decimal,
}

impl Execution {
    /// Signed change in cash caused by this fill.
    pub fn cash_flow(&self) -> Decimal {
        match self.side {
            OrderSide::Buy => -(self.gross_value + self.fee),
            OrderSide::Sell => self.gross_value - self.fee,
        }
    }
}
