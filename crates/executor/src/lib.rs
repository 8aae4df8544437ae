//! # Executor Crate
//!
//! This crate provides the core components for simulated trade execution and
//! account state. It defines a generic `Executor` trait with a
//! `SimulatedExecutor` implementation, the `DcaPosition` state machine, and a
//! `Portfolio` that ties cash and the open position together.
//!
//! ## Architectural Principles
//!
//! - **State vs. Logic Decoupling:** The `Executor` is a pure calculator that
//!   determines the effects of a fill (fees and slippage) without mutating
//!   state. The `Portfolio` applies the resulting `Execution` to cash and the
//!   position.
//! - **Derived, Not Accumulated:** A `DcaPosition` stores only its lots. The
//!   average price, total quantity and total cost are recomputed from them on
//!   every call, so no running total can drift.
//!
//! ## Public API
//!
//! - `Executor`: The core trait for execution engines.
//! - `SimulatedExecutor`: The "virtual exchange" for backtesting.
//! - `DcaPosition`: One open position built from up to `max_lots` lots.
//! - `Portfolio`: Cash plus at most one open position.
//! - `ExecutorError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod exchange;
pub mod portfolio;
pub mod position;

// Re-export the key components to provide a clean, public-facing API.
pub use error::ExecutorError;
pub use exchange::{Executor, SimulatedExecutor};
pub use portfolio::Portfolio;
pub use position::DcaPosition;
