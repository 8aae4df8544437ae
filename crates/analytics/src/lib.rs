//! # Analytics Engine
//!
//! This crate turns the trade ledger and equity curve of a finished backtest
//! into performance metrics. It acts as the "unbiased judge" of the system.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** It has no knowledge of external systems and depends only
//!   on `core-types`.
//! - **Stateless Calculation:** The `AnalyticsEngine` is a stateless calculator. It takes
//!   raw trading data as input and produces a `PerformanceReport` as output.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The main struct that contains the calculation logic.
//! - `PerformanceReport`: The standardized struct that holds all performance metrics.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::PerformanceReport;
