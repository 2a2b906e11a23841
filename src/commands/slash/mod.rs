//! # Slash Commands (/)
//!
//! Discord native slash command definitions, registration and option helpers.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: /cloudflareai group command, guild and global registration

pub mod cloudflare_ai;

use anyhow::Result;
use log::info;
use serenity::model::application::command::{Command, CommandOptionType};
use serenity::model::application::interaction::application_command::{
    CommandDataOption, CommandDataOptionValue,
};
use serenity::model::channel::Attachment;
use serenity::model::id::GuildId;
use serenity::prelude::Context;

use crate::commands::registry::CommandRegistry;

/// Registers every loaded group's slash commands globally
pub async fn register_global_commands(ctx: &Context, registry: &CommandRegistry) -> Result<()> {
    let slash_commands = registry.slash_commands();
    let count = slash_commands.len();

    Command::set_global_application_commands(&ctx.http, |commands| {
        for command in slash_commands {
            commands.add_application_command(command);
        }
        commands
    })
    .await?;

    info!("Global slash commands registered successfully ({count} commands)");
    Ok(())
}

/// Registers every loaded group's slash commands for a specific guild (faster for testing)
pub async fn register_guild_commands(
    ctx: &Context,
    guild_id: GuildId,
    registry: &CommandRegistry,
) -> Result<()> {
    let slash_commands = registry.slash_commands();
    let count = slash_commands.len();

    guild_id
        .set_application_commands(&ctx.http, |commands| {
            for command in slash_commands {
                commands.add_application_command(command);
            }
            commands
        })
        .await?;

    info!("Guild slash commands registered for guild {guild_id} ({count} commands)");
    Ok(())
}

/// Register for one guild when configured, otherwise globally
pub async fn register_commands(
    ctx: &Context,
    guild_id: Option<GuildId>,
    registry: &CommandRegistry,
) -> Result<()> {
    match guild_id {
        Some(guild_id) => register_guild_commands(ctx, guild_id, registry).await,
        None => register_global_commands(ctx, registry).await,
    }
}

/// The invoked subcommand and its options, if the interaction used one
pub fn get_subcommand(options: &[CommandDataOption]) -> Option<(&str, &[CommandDataOption])> {
    options
        .iter()
        .find(|opt| opt.kind == CommandOptionType::SubCommand)
        .map(|opt| (opt.name.as_str(), opt.options.as_slice()))
}

/// Utility function to get string option from slash command
pub fn get_string_option(options: &[CommandDataOption], name: &str) -> Option<String> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_ref())
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

/// Utility function to get a resolved attachment option from slash command
pub fn get_attachment_option(options: &[CommandDataOption], name: &str) -> Option<Attachment> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.resolved.as_ref())
        .and_then(|val| match val {
            CommandDataOptionValue::Attachment(attachment) => Some(attachment.clone()),
            _ => None,
        })
}
