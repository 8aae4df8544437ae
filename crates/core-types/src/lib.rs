pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{ExitReason, Interval, OrderSide, Signal, StrategyId};
pub use error::CoreError;
pub use structs::{Candle, EquitySample, Execution, Lot, OrderRequest, Trade};
