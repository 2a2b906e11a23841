//! Per-group handler implementations
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: CloudflareAiHandler slash group and AdminHandler text commands

pub mod admin;
pub mod cloudflare_ai;

use std::sync::Arc;

use super::handler::SlashCommandHandler;

/// Every slash command group the bot ships with
///
/// Returns a vector of handlers ready to be loaded into a CommandRegistry.
pub fn create_all_handlers() -> Vec<Arc<dyn SlashCommandHandler>> {
    vec![Arc::new(cloudflare_ai::CloudflareAiHandler)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::test_support::{test_config, Canned, MockAi};
    use crate::commands::context::CommandContext;
    use crate::commands::registry::CommandRegistry;

    #[test]
    fn test_all_handlers_load_without_credentials() {
        let ctx = CommandContext::new(test_config(), Arc::new(MockAi::new(Canned::Ok)));
        let registry = CommandRegistry::load(create_all_handlers(), &ctx);

        assert!(registry.contains("cloudflareai"));
        assert_eq!(registry.group_names(), vec!["cloudflareai"]);
    }
}
