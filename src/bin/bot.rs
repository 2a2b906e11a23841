use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};
use serenity::async_trait;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;

use cloudflare_ai_bot::commands::reply::{fill_edit, fill_message};
use cloudflare_ai_bot::commands::{
    create_all_handlers, register_commands, AdminHandler, CommandContext, CommandRegistry, Reply,
};
use cloudflare_ai_bot::core::Config;
use cloudflare_ai_bot::features::workers_ai::WorkersAiClient;

struct Handler {
    context: Arc<CommandContext>,
    registry: Arc<CommandRegistry>,
    admin: AdminHandler,
    guild_id: Option<GuildId>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        if let Err(e) = self.admin.handle_message(&ctx, &msg, &self.registry).await {
            error!("Error handling text command from {}: {e}", msg.author.id);
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Ready: {} ID: {}", ready.user.name, ready.user.id);
        info!("📡 Connected to {} guilds", ready.guilds.len());

        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }

        // Guild registration is instant; global registration may take up to an hour
        match self.guild_id {
            Some(guild_id) => info!("🔧 Registering commands for guild {guild_id}"),
            None => info!("🌍 Registering commands globally"),
        }
        if let Err(e) = register_commands(&ctx, self.guild_id, &self.registry).await {
            error!("❌ Failed to register slash commands: {e}");
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::ApplicationCommand(command) = interaction {
            if let Err(e) = self
                .registry
                .dispatch(self.context.clone(), &ctx, &command)
                .await
            {
                error!(
                    "Error handling slash command '{}': {e:#}",
                    command.data.name
                );

                // Edit the deferred response if there is one, otherwise answer fresh
                if command
                    .edit_original_interaction_response(&ctx.http, |response| {
                        fill_edit(response, &Reply::Failure)
                    })
                    .await
                    .is_err()
                {
                    if let Err(e) = command
                        .create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    fill_message(message, &Reply::Failure)
                                })
                        })
                        .await
                    {
                        error!("Failed to send error response: {e}");
                    }
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Arc::new(Config::from_env()?);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Cloudflare AI Discord Bot...");

    let ai = WorkersAiClient::new(
        config.cloudflare_api_key.clone(),
        config.cloudflare_account_id.clone(),
    )?;
    let context = Arc::new(CommandContext::new(config.clone(), Arc::new(ai)));
    let registry = Arc::new(CommandRegistry::load(create_all_handlers(), &context));
    info!(
        "Loaded {} handler group(s): {:?}",
        registry.group_names().len(),
        registry.group_names()
    );

    let guild_id = config.guild_id().map(GuildId);

    let handler = Handler {
        context,
        registry,
        admin: AdminHandler::new(config.command_prefix.clone(), guild_id),
        guild_id,
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::GUILD_EMOJIS_AND_STICKERS
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Text command prefix: '{}'", config.command_prefix);
    info!("Establishing WebSocket connection to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
