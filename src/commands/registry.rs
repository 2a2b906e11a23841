//! Command handler registry
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Isolated group loading, name dispatch and command definitions

use anyhow::Result;
use log::{error, info, warn};
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::prelude::Context;
use std::collections::HashMap;
use std::sync::Arc;

use super::context::CommandContext;
use super::handler::SlashCommandHandler;

/// Registry mapping command names to handler groups
///
/// # Example
///
/// ```ignore
/// let registry = CommandRegistry::load(create_all_handlers(), &ctx);
///
/// if let Some(handler) = registry.get("cloudflareai") {
///     handler.handle(ctx, serenity_ctx, command).await?;
/// }
/// ```
#[derive(Clone)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Arc<dyn SlashCommandHandler>>,
    groups: Vec<Arc<dyn SlashCommandHandler>>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            groups: Vec::new(),
        }
    }

    /// Load every group, skipping any whose `load` fails
    pub fn load(groups: Vec<Arc<dyn SlashCommandHandler>>, ctx: &CommandContext) -> Self {
        let mut registry = Self::new();
        for group in groups {
            match group.load(ctx) {
                Ok(()) => {
                    info!("Loaded handler group: {}", group.group_name());
                    registry.register(group);
                }
                Err(e) => {
                    error!(
                        "Could not load handler group: {} due to {e:#}",
                        group.group_name()
                    );
                }
            }
        }
        registry
    }

    /// Register a handler for its declared command names
    pub fn register(&mut self, handler: Arc<dyn SlashCommandHandler>) {
        for name in handler.command_names() {
            if self.handlers.insert(name, Arc::clone(&handler)).is_some() {
                warn!("Command '{name}' registered twice; last group wins");
            }
        }
        self.groups.push(handler);
    }

    /// Get handler for a command name
    pub fn get(&self, name: &str) -> Option<Arc<dyn SlashCommandHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Check if a command is registered
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of registered command names
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Names of the loaded groups, in load order
    pub fn group_names(&self) -> Vec<&'static str> {
        self.groups.iter().map(|g| g.group_name()).collect()
    }

    /// Slash command definitions from every loaded group
    pub fn slash_commands(&self) -> Vec<CreateApplicationCommand> {
        self.groups
            .iter()
            .flat_map(|g| g.create_commands())
            .collect()
    }

    /// Route an interaction to its handler. Unknown commands are logged and ignored.
    pub async fn dispatch(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        match self.get(&command.data.name) {
            Some(handler) => handler.handle(ctx, serenity_ctx, command).await,
            None => {
                warn!("No handler registered for command '{}'", command.data.name);
                Ok(())
            }
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::test_support::{test_config, Canned, MockAi};
    use async_trait::async_trait;

    // Mock handler for testing
    struct MockHandler {
        group: &'static str,
        names: &'static [&'static str],
        fail_load: bool,
    }

    #[async_trait]
    impl SlashCommandHandler for MockHandler {
        fn group_name(&self) -> &'static str {
            self.group
        }

        fn command_names(&self) -> &'static [&'static str] {
            self.names
        }

        fn create_commands(&self) -> Vec<CreateApplicationCommand> {
            self.names
                .iter()
                .map(|name| {
                    let mut command = CreateApplicationCommand::default();
                    command.name(name).description("test");
                    command
                })
                .collect()
        }

        fn load(&self, _ctx: &CommandContext) -> Result<()> {
            if self.fail_load {
                anyhow::bail!("missing entry point")
            }
            Ok(())
        }

        async fn handle(
            &self,
            _ctx: Arc<CommandContext>,
            _serenity_ctx: &Context,
            _command: &ApplicationCommandInteraction,
        ) -> Result<()> {
            Ok(())
        }
    }

    fn mock(group: &'static str, names: &'static [&'static str], fail_load: bool) -> Arc<dyn SlashCommandHandler> {
        Arc::new(MockHandler {
            group,
            names,
            fail_load,
        })
    }

    fn test_context() -> CommandContext {
        CommandContext::new(test_config(), Arc::new(MockAi::new(Canned::Ok)))
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.slash_commands().is_empty());
    }

    #[test]
    fn test_registry_register_multiple_names() {
        let mut registry = CommandRegistry::new();
        registry.register(mock("multi", &["one", "two"], false));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("one"));
        assert!(registry.contains("two"));
        assert!(registry.get("three").is_none());
        assert_eq!(registry.group_names(), vec!["multi"]);
    }

    #[test]
    fn test_failed_group_is_skipped_others_load() {
        let ctx = test_context();
        let registry = CommandRegistry::load(
            vec![
                mock("broken", &["broken"], true),
                mock("working", &["working"], false),
            ],
            &ctx,
        );

        assert!(!registry.contains("broken"));
        assert!(registry.contains("working"));
        assert_eq!(registry.group_names(), vec!["working"]);
        assert_eq!(registry.slash_commands().len(), 1);
    }

    #[test]
    fn test_all_groups_failing_leaves_empty_registry() {
        let ctx = test_context();
        let registry = CommandRegistry::load(vec![mock("broken", &["broken"], true)], &ctx);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_default() {
        let registry = CommandRegistry::default();
        assert!(registry.is_empty());
    }
}
