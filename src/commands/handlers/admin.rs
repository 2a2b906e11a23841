//! Administrative text commands
//!
//! Handles: {prefix}sync (application owner only, hidden)
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Manual slash command sync

use anyhow::Result;
use log::{debug, error, info, warn};
use serenity::model::application::Team;
use serenity::model::channel::Message;
use serenity::model::id::{GuildId, UserId};
use serenity::prelude::Context;
use std::time::Duration;
use tokio::time::sleep;

use crate::commands::registry::CommandRegistry;
use crate::commands::slash::register_commands;

/// How long the "Synced" confirmation stays visible
const CONFIRMATION_LIFETIME: Duration = Duration::from_secs(5);

/// Text commands understood after the prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    Sync,
}

impl AdminCommand {
    /// Parse `{prefix}{command}`; anything else is not an admin command
    pub fn parse(prefix: &str, content: &str) -> Option<Self> {
        let rest = content.trim().strip_prefix(prefix)?;
        match rest.trim().to_lowercase().as_str() {
            "sync" => Some(AdminCommand::Sync),
            _ => None,
        }
    }
}

/// The application owner, or any member of the team that owns the application
fn is_owner(owner: UserId, team: Option<&Team>, user: UserId) -> bool {
    match team {
        Some(team) => {
            team.owner_user_id == user || team.members.iter().any(|m| m.user.id == user)
        }
        None => owner == user,
    }
}

/// Handler for prefix admin commands
pub struct AdminHandler {
    prefix: String,
    guild_id: Option<GuildId>,
}

impl AdminHandler {
    pub fn new(prefix: impl Into<String>, guild_id: Option<GuildId>) -> Self {
        AdminHandler {
            prefix: prefix.into(),
            guild_id,
        }
    }

    /// Handle a guild or DM message if it is an admin command from the owner
    pub async fn handle_message(
        &self,
        serenity_ctx: &Context,
        msg: &Message,
        registry: &CommandRegistry,
    ) -> Result<()> {
        let Some(command) = AdminCommand::parse(&self.prefix, &msg.content) else {
            return Ok(());
        };

        let info = serenity_ctx.http.get_current_application_info().await?;
        if !is_owner(info.owner.id, info.team.as_ref(), msg.author.id) {
            debug!("Ignoring {command:?} from non-owner {}", msg.author.id);
            return Ok(());
        }

        match command {
            AdminCommand::Sync => self.handle_sync(serenity_ctx, msg, registry).await,
        }
    }

    /// Re-register slash commands with Discord
    async fn handle_sync(
        &self,
        serenity_ctx: &Context,
        msg: &Message,
        registry: &CommandRegistry,
    ) -> Result<()> {
        if let Err(e) = msg.delete(&serenity_ctx.http).await {
            warn!("Could not delete sync request message: {e}");
        }

        let mut status = msg.channel_id.say(&serenity_ctx.http, "Syncing... 🔄").await?;

        if let Err(e) = register_commands(serenity_ctx, self.guild_id, registry).await {
            error!("Error: {e}");
            msg.channel_id
                .say(&serenity_ctx.http, "An error occurred while syncing.")
                .await?;
            return Ok(());
        }

        info!("Slash commands synced by owner {}", msg.author.id);
        status
            .edit(&serenity_ctx.http, |m| m.content("Synced successfully! ✅"))
            .await?;
        sleep(CONFIRMATION_LIFETIME).await;
        status.delete(&serenity_ctx.http).await?;
        Ok(())
    }
}
