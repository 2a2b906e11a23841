//! Process configuration read once from the environment
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Discord token, command prefix, Cloudflare credentials, guild and log level

use anyhow::Result;

/// Default prefix for text commands such as `>sync`
pub const DEFAULT_PREFIX: &str = ">";
/// Default `env_logger` filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub command_prefix: String,
    /// Missing credentials do not stop the bot from connecting; AI commands fail instead.
    pub cloudflare_api_key: Option<String>,
    pub cloudflare_account_id: Option<String>,
    /// Register slash commands for this guild only (instant propagation during development)
    pub discord_guild_id: Option<String>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let discord_token = get("DISCORD_TOKEN")
            .ok_or_else(|| anyhow::anyhow!("DISCORD_TOKEN environment variable not set"))?;

        Ok(Config {
            discord_token,
            command_prefix: get("PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            cloudflare_api_key: get("CLOUDFLARE_API_KEY"),
            cloudflare_account_id: get("CLOUDFLARE_ACCOUNT_IDENTIFIER"),
            discord_guild_id: get("DISCORD_GUILD_ID"),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }

    /// Parsed guild id for guild-scoped command registration
    pub fn guild_id(&self) -> Option<u64> {
        self.discord_guild_id
            .as_ref()
            .and_then(|id| id.parse::<u64>().ok())
    }
}
