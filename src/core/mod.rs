//! # Core Module
//!
//! Configuration, Discord length limits, and shared embed builders.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Initial creation with config, response and embeds modules

pub mod config;
pub mod embeds;
pub mod response;

// Re-export commonly used items
pub use config::Config;
pub use response::{truncate_for_message, truncate_to, EMBED_LIMIT, MESSAGE_LIMIT};
