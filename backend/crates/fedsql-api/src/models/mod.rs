//! API data models
//!
//! Request and response bodies of the `/api` surface. The SQL envelope lives
//! in [`sql_response`]; every REST error uses [`ErrorResponse`].

pub mod error_response;
pub mod sql_request;
pub mod sql_response;

pub use error_response::ErrorResponse;
pub use sql_request::QueryRequest;
pub use sql_response::{ErrorCode, QueryResponse, ResponseType};
