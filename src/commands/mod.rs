//! # Command System
//!
//! Slash command (/) handling for Discord interactions plus prefix admin commands.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Handler trait, registry, capability table and single-message replies

pub mod capability;
pub mod context;
pub mod handler;
pub mod handlers;
pub mod registry;
pub mod reply;
pub mod slash;

// Re-export handler infrastructure
pub use capability::Capability;
pub use context::CommandContext;
pub use handler::SlashCommandHandler;
pub use handlers::admin::AdminHandler;
pub use handlers::create_all_handlers;
pub use registry::CommandRegistry;
pub use reply::Reply;

// Re-export commonly used items from submodules
pub use slash::{
    get_attachment_option, get_string_option, get_subcommand, register_commands,
    register_global_commands, register_guild_commands,
};
