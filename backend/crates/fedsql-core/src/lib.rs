//! Execution core of the FedSQL gateway.
//!
//! [`AppContext`] wires the services together: the data source registry
//! resolves table references, the file store and predictor manager own
//! their tables, and the SQL executor routes statements across all of them.

pub mod app_context;
pub mod connectors;
pub mod error;
pub mod files;
pub mod jobs;
pub mod predictors;
pub mod registry;
pub mod result;
pub mod sql;
pub mod tabs;

pub use app_context::AppContext;
pub use error::{GatewayError, GatewayResult};
pub use result::{ExecutionResult, SqlContext, TableData};
