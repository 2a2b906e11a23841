//! # Features Layer
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

pub mod rate_limiting;
pub mod workers_ai;

pub use rate_limiting::RateLimiter;
pub use workers_ai::{AiResponse, WorkersAi, WorkersAiClient, WorkersAiError};
