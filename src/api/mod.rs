//! API module
//!
//! HTTP endpoints over the ledger service.

pub mod routes;

pub use routes::create_router;
