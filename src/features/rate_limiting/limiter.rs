//! # Feature: Command Cooldowns
//!
//! Sliding-window limiter keyed by (guild, user). Uses DashMap for lock-sharded
//! concurrent access from every interaction task. A rejected call reports how
//! long until the oldest request leaves the window.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Per (guild_id, user_id) sliding window with retry-after reporting

use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Composite key: (guild_id, user_id). DMs have no guild.
pub type CooldownKey = (Option<u64>, u64);

pub struct RateLimiter {
    requests: DashMap<CooldownKey, Vec<Instant>>,
    max_requests: usize,
    time_window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, time_window: Duration) -> Self {
        RateLimiter {
            requests: DashMap::new(),
            max_requests,
            time_window,
        }
    }

    /// Record a request for `key` if it is under the limit.
    ///
    /// Returns `Err(retry_after)` without recording anything when the key is
    /// still cooling down.
    pub fn check(&self, guild_id: Option<u64>, user_id: u64) -> Result<(), Duration> {
        self.check_at((guild_id, user_id), Instant::now())
    }

    fn check_at(&self, key: CooldownKey, now: Instant) -> Result<(), Duration> {
        let mut entry = self.requests.entry(key).or_default();

        entry.retain(|&time| now.duration_since(time) < self.time_window);

        if entry.len() >= self.max_requests {
            let oldest = entry.first().copied().unwrap_or(now);
            Err(self
                .time_window
                .saturating_sub(now.duration_since(oldest)))
        } else {
            entry.push(now);
            Ok(())
        }
    }
}
