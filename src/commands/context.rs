//! Shared context for command handlers
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Config, Workers AI client and per-capability cooldowns

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::commands::capability::Capability;
use crate::core::Config;
use crate::features::rate_limiting::RateLimiter;
use crate::features::workers_ai::WorkersAi;

/// Shared context for all command handlers
///
/// Built once at startup and handed to every invocation behind an `Arc`.
/// The AI client is stateless apart from its credentials, so no locking is
/// needed around it.
pub struct CommandContext {
    pub config: Arc<Config>,
    pub ai: Arc<dyn WorkersAi>,
    cooldowns: HashMap<Capability, RateLimiter>,
}

impl CommandContext {
    pub fn new(config: Arc<Config>, ai: Arc<dyn WorkersAi>) -> Self {
        let cooldowns = Capability::ALL
            .into_iter()
            .filter_map(|c| c.cooldown().map(|window| (c, RateLimiter::new(1, window))))
            .collect();

        Self {
            config,
            ai,
            cooldowns,
        }
    }

    /// Claim a cooldown slot for this capability.
    ///
    /// `Err(retry_after)` when the same (guild, user) invoked it within the window.
    pub fn check_cooldown(
        &self,
        capability: Capability,
        guild_id: Option<u64>,
        user_id: u64,
    ) -> Result<(), Duration> {
        match self.cooldowns.get(&capability) {
            Some(limiter) => limiter.check(guild_id, user_id),
            None => Ok(()),
        }
    }
}
