//! # Rate Limiting Feature
//!
//! Per-capability cooldowns keyed by guild and user.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod limiter;

pub use limiter::{CooldownKey, RateLimiter};
