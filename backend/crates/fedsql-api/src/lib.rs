// FedSQL API Library
//
// This crate provides the HTTP layer for the FedSQL gateway:
// routes, handlers, session and auth middleware, and the wire models.

#[cfg(test)]
#[macro_use]
mod test_support;

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;

pub use routes::configure_routes;
