//! SQL Execution Handlers
//!
//! One module per statement family, each adding methods to
//! [`SqlExecutor`](super::SqlExecutor):
//! - **query**: SELECT over files, external sources, system tables and models
//! - **show**: the MySQL-compatible SHOW family
//! - **ddl**: DESCRIBE, CREATE/DROP DATABASE, DROP TABLE, CREATE/DROP PROJECT
//! - **predictor**: CREATE PREDICTOR, RETRAIN, DROP PREDICTOR

mod ddl;
mod predictor;
mod query;
mod show;
