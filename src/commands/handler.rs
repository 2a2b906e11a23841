//! Slash command handler trait and infrastructure
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Handler groups with load step and command definitions

use anyhow::Result;
use async_trait::async_trait;
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::prelude::Context;
use std::sync::Arc;

use super::context::CommandContext;

/// Trait for slash command handler groups
///
/// Each group owns one or more top-level slash commands. Groups are loaded
/// into a [`CommandRegistry`](super::registry::CommandRegistry) at startup and
/// dispatched by command name.
///
/// # Example
///
/// ```ignore
/// pub struct PingHandler;
///
/// #[async_trait]
/// impl SlashCommandHandler for PingHandler {
///     fn group_name(&self) -> &'static str {
///         "utility"
///     }
///
///     fn command_names(&self) -> &'static [&'static str] {
///         &["ping"]
///     }
///
///     fn create_commands(&self) -> Vec<CreateApplicationCommand> {
///         vec![]
///     }
///
///     async fn handle(
///         &self,
///         ctx: Arc<CommandContext>,
///         serenity_ctx: &Context,
///         command: &ApplicationCommandInteraction,
///     ) -> Result<()> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait SlashCommandHandler: Send + Sync {
    /// Name used in startup logs
    fn group_name(&self) -> &'static str;

    /// Command name(s) this handler processes
    fn command_names(&self) -> &'static [&'static str];

    /// Slash command definitions registered with Discord for this group
    fn create_commands(&self) -> Vec<CreateApplicationCommand>;

    /// Startup hook. An error here skips the group without stopping the bot.
    fn load(&self, _ctx: &CommandContext) -> Result<()> {
        Ok(())
    }

    /// Handle the slash command
    ///
    /// # Arguments
    ///
    /// * `ctx` - Shared command context with config, AI client and cooldowns
    /// * `serenity_ctx` - Serenity context for Discord API calls
    /// * `command` - The slash command interaction to handle
    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()>;
}
