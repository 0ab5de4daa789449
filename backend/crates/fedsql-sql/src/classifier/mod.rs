//! Statement classification.
//!
//! One pass: the leading keywords pick the parser, and the parsed form is
//! carried in [`SqlStatementKind`] so nothing is parsed twice.

mod engine;
mod types;

pub use engine::classify;
pub use types::{SqlStatement, SqlStatementKind, StatementClassificationError};
