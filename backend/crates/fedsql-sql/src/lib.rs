//! SQL front end for the FedSQL gateway.
//!
//! `SELECT` statements go through `sqlparser` with the MySQL dialect (so
//! `"a"` is a string literal, as MySQL clients expect). Gateway statements
//! such as `CREATE DATABASE ... WITH ENGINE`, `CREATE PREDICTOR` and the
//! `SHOW` family have no sqlparser grammar and are handled by the small
//! parsers in [`ddl`].

pub mod classifier;
pub mod ddl;
pub mod parser;
pub mod redact;

pub use classifier::{classify, SqlStatement, SqlStatementKind, StatementClassificationError};
pub use ddl::DdlResult;
pub use redact::redact_sensitive_sql;
