//! SQL execution.
//!
//! `SELECT` runs over an in-memory relation built from one resolved table
//! (optionally joined with a predictor); everything else is dispatched to
//! the handlers in [`executor::handlers`].

pub mod context;
pub mod eval;
pub mod executor;
pub mod variables;

pub use context::ExecutionContext;
pub use executor::SqlExecutor;
