//! # Market Data
//!
//! Loads OHLCV candles from CSV and prepares them for simulation: sorted by
//! time, one candle per timestamp, implausible rows removed.
//!
//! Expected header: `timestamp,open,high,low,close,volume`. Timestamps may be
//! RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC), or integer epoch milliseconds.

pub mod error;
pub mod ohlcv;

pub use error::DataError;
pub use ohlcv::{DataQualityReport, filter_range, load_candles_csv, prepare_candles, read_candles};
