//! Single-message replies for AI commands
//!
//! A handler computes exactly one [`Reply`] per invocation; rendering it to
//! Discord is a separate step so the outcome can be checked without a gateway.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Text, image, API error, generic failure and cooldown replies

use anyhow::Result;
use serenity::builder::{
    CreateAllowedMentions, CreateEmbed, CreateInteractionResponseData,
    CreateInteractionResponseFollowup, EditInteractionResponse, ParseValue,
};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::AttachmentType;
use serenity::prelude::Context;
use std::borrow::Cow;
use std::time::Duration;

use crate::core::embeds::{image_result_embed, IMAGE_FILENAME};
use crate::core::truncate_for_message;
use crate::features::workers_ai::{AiResponse, Classification};

/// Shown for any transport or unexpected failure; details go to the log only.
pub const FAILURE_MESSAGE: &str = "An error occurred, please try again later";

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    /// Generated image, sent as an embed plus attachment
    Image {
        prompt: String,
        image: Vec<u8>,
        elapsed: Duration,
    },
    /// The API answered with a non-200 status
    ApiError { status_code: u16, reason: String },
    Failure,
    Cooldown { retry_after: Duration },
}

impl Reply {
    pub fn api_error<T>(response: &AiResponse<T>) -> Self {
        Reply::ApiError {
            status_code: response.status_code,
            reason: response.reason.clone(),
        }
    }

    /// Message content for text-shaped replies; `None` for images
    pub fn content(&self) -> Option<String> {
        match self {
            Reply::Text(text) => Some(truncate_for_message(text)),
            Reply::Image { .. } => None,
            Reply::ApiError {
                status_code,
                reason,
            } => Some(format!(
                "The Cloudflare AI returned an error: {status_code} {reason}"
            )),
            Reply::Failure => Some(FAILURE_MESSAGE.to_string()),
            Reply::Cooldown { retry_after } => Some(format!(
                "This command is on cooldown, please try again in {:.2} seconds.",
                retry_after.as_secs_f64()
            )),
        }
    }

    pub fn has_attachment(&self) -> bool {
        matches!(self, Reply::Image { .. })
    }

    /// Short outcome label for log lines
    pub fn outcome(&self) -> &'static str {
        match self {
            Reply::Text(_) => "text",
            Reply::Image { .. } => "image",
            Reply::ApiError { .. } => "api_error",
            Reply::Failure => "failure",
            Reply::Cooldown { .. } => "cooldown",
        }
    }
}

/// Render classification labels, highest score first
pub fn format_classifications(labels: &[Classification]) -> String {
    if labels.is_empty() {
        return "No labels returned for this image.".to_string();
    }

    let mut sorted: Vec<&Classification> = labels.iter().collect();
    sorted.sort_by(|a, b| b.score.total_cmp(&a.score));

    sorted
        .iter()
        .map(|c| format!("**{}**: {:.2}%", c.label, c.score * 100.0))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Mentions in replies may ping users, never roles or @everyone
pub fn users_only(mentions: &mut CreateAllowedMentions) -> &mut CreateAllowedMentions {
    mentions.parse(ParseValue::Users)
}

/// Fill a fresh interaction response with a text-shaped reply
pub fn fill_message<'a, 'b>(
    message: &'b mut CreateInteractionResponseData<'a>,
    reply: &Reply,
) -> &'b mut CreateInteractionResponseData<'a> {
    message
        .content(reply.content().unwrap_or_default())
        .allowed_mentions(users_only)
}

/// Fill an edit of the deferred response with a text-shaped reply
pub fn fill_edit<'b>(
    response: &'b mut EditInteractionResponse,
    reply: &Reply,
) -> &'b mut EditInteractionResponse {
    response
        .content(reply.content().unwrap_or_default())
        .allowed_mentions(users_only)
}

fn fill_image<'a, 'b>(
    message: &'b mut CreateInteractionResponseFollowup<'a>,
    embed: CreateEmbed,
    image: Vec<u8>,
) -> &'b mut CreateInteractionResponseFollowup<'a> {
    message
        .add_embed(embed)
        .add_file(AttachmentType::Bytes {
            data: Cow::Owned(image),
            filename: IMAGE_FILENAME.to_string(),
        })
        .allowed_mentions(users_only)
}

/// Answer an interaction that has not been deferred yet
pub async fn respond(
    serenity_ctx: &Context,
    command: &ApplicationCommandInteraction,
    reply: &Reply,
) -> Result<()> {
    command
        .create_interaction_response(&serenity_ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| fill_message(message, reply))
        })
        .await?;
    Ok(())
}

/// Fill in a deferred interaction with the final reply.
///
/// Images go out as the first followup, which replaces the deferred "thinking"
/// state; everything else edits the original response.
pub async fn deliver(
    serenity_ctx: &Context,
    command: &ApplicationCommandInteraction,
    reply: Reply,
) -> Result<()> {
    match reply {
        Reply::Image {
            prompt,
            image,
            elapsed,
        } => {
            let embed = image_result_embed(&prompt, elapsed, command.id.created_at());
            command
                .create_followup_message(&serenity_ctx.http, |message| {
                    fill_image(message, embed, image)
                })
                .await?;
        }
        other => {
            command
                .edit_original_interaction_response(&serenity_ctx.http, |response| {
                    fill_edit(response, &other)
                })
                .await?;
        }
    }
    Ok(())
}
