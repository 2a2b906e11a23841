// Core layer - configuration, limits and embeds
pub mod core;

// Features layer - Workers AI client and cooldowns
pub mod features;

// Application layer
pub mod commands;

pub use core::Config;

pub use features::{AiResponse, RateLimiter, WorkersAi, WorkersAiClient, WorkersAiError};
