//! HTTP API for the reader service
//!
//! Inbound control endpoints plus the outbound SSE event stream.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{create_router, AppContext};
