//! # Strategy Library
//!
//! This crate contains the entry-signal logic. It defines a universal
//! `Strategy` trait and provides several concrete implementations.
//!
//! ## Architectural Principles
//!
//! - **Pure Signal Logic:** A strategy only answers "would I buy or sell given
//!   this history?". It never sees the open position; filtering signals against
//!   position state is the backtester's job.
//! - **No Look-Ahead:** A strategy receives the candles up to and including the
//!   current one and nothing later.
//! - **Fresh Instances:** The only internal state a strategy may keep is the
//!   time of its last buy signal (for cooldowns). A new run constructs a new
//!   instance through `create_strategy`, which is how state is reset.
//!
//! ## Public API
//!
//! - `Strategy`: The core trait all strategies implement.
//! - `create_strategy`: The factory function to construct a strategy instance.
//! - The concrete strategy structs themselves (e.g., `RsiReversion`).

// Declare all the modules that constitute this crate.
pub mod bollinger_breakout;
pub mod error;
pub mod factory;
pub mod hybrid_smart;
pub mod macd_crossover;
pub mod multi_signal;
pub mod proximity_bollinger;
pub mod rsi_reversion;
mod window;

// Re-export the key components to create a clean, public-facing API.
pub use bollinger_breakout::BollingerBreakout;
pub use error::StrategyError;
pub use factory::create_strategy;
pub use hybrid_smart::HybridSmart;
pub use macd_crossover::MacdCrossover;
pub use multi_signal::MultiSignal;
pub use proximity_bollinger::ProximityBollinger;
pub use rsi_reversion::RsiReversion;

pub use core_types::StrategyId;

use chrono::{DateTime, Utc};
use core_types::{Candle, Signal};

/// The core trait that all entry strategies must implement.
///
/// The `&mut self` in `generate_signal` lets time-gated strategies remember
/// their last buy. The `Send + Sync` bounds are required to allow strategies
/// to be moved into the parallel optimizer's workers.
pub trait Strategy: Send + Sync {
    fn id(&self) -> StrategyId;

    /// Candles required before the strategy can emit anything but `Hold`.
    fn min_history(&self) -> usize;

    /// The strategy's configuration as a JSON object.
    fn parameters(&self) -> serde_json::Value;

    /// Decides on the latest candle of `window`.
    ///
    /// # Arguments
    ///
    /// * `window` - Candles up to and including the current one, oldest first.
    /// * `now` - Decision time for cooldowns. Defaults to the last candle's timestamp.
    ///
    /// # Returns
    ///
    /// `Signal::Hold` whenever history is too short or an indicator value is
    /// undefined.
    fn generate_signal(
        &mut self,
        window: &[Candle],
        now: Option<DateTime<Utc>>,
    ) -> Result<Signal, StrategyError>;
}
