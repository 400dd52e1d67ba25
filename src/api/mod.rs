//! HTTP API layer for the gatekeeper.
//!
//! Provides access-check endpoints and the guarded identity endpoint.

pub mod handlers;
mod routes;
mod types;

pub use routes::{build_router, ApiDoc};
