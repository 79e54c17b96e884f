//! llmapi_daemon - HTTP server in front of the model session
//!
//! This crate provides the daemon server that:
//! - Exposes chat, status, health and metrics endpoints
//! - Builds the application state once at startup and verifies the model
//! - Renders service errors as structured JSON responses

pub mod api;
pub mod metrics;
pub mod server;
pub mod state;

pub use server::run_server;
pub use state::AppState;
