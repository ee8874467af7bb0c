//! HTTP server for the invoice dashboard
//!
//! This module provides a `ServerBuilder` that wires the data service, the
//! auth provider and the view cache into an axum router with:
//! - a public sign-in surface
//! - session-gated page loaders and mutation endpoints

pub mod builder;
pub mod handlers;
pub mod host;
pub mod middleware;
pub mod router;

pub use builder::ServerBuilder;
pub use host::ServerHost;
pub use router::build_router;
