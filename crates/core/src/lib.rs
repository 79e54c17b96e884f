//! llmapi_core - Model session lifecycle and response normalization
//!
//! This crate provides:
//! - The model session (catalog check, generate)
//! - Normalization of heterogeneous backend replies
//! - Health snapshots with optional GPU telemetry
//! - The service error taxonomy and its status/payload mapping
//! - File and environment configuration

pub mod config;
pub mod error;
pub mod gpu;
pub mod health;
pub mod normalize;
pub mod session;

pub use config::Config;
pub use error::{ErrorPayload, ServiceError, StatusClass};
pub use gpu::{GpuProbe, GpuStatus, NvidiaSmiProbe};
pub use health::{HealthMonitor, HealthSnapshot, HealthStatus};
pub use normalize::{normalize, ChatResult, UnrecognizedResponseShape};
pub use session::{catalog_accepts, ModelSession};
