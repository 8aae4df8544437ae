//! # Risk Crate
//!
//! Decides how much capital each DCA lot may use.
//!
//! A position's capital is fixed up front: a fraction of the initial capital
//! split evenly across the maximum number of lots. A lot that the remaining
//! cash cannot cover is simply not placed.

pub mod error;
pub mod lot_sizer;

pub use error::RiskError;
pub use lot_sizer::EqualLotSizer;

use core_types::OrderRequest;
use rust_decimal::Decimal;

/// Sizes entry orders.
pub trait RiskManager: Send + Sync {
    /// Returns the buy order for the next lot, or `None` when `cash` cannot
    /// cover it. Running out of cash is a normal condition, not an error.
    fn size_entry(&self, cash: Decimal) -> Option<OrderRequest>;

    /// Maximum number of lots per position.
    fn max_lots(&self) -> u32;
}
