//! Embed builders for Workers AI results
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Image generation result embed

use crate::core::response::truncate_to;
use crate::core::EMBED_LIMIT;
use serenity::builder::CreateEmbed;
use serenity::model::Timestamp;
use std::time::Duration;

/// Discord "blurple" brand colour
pub const BLURPLE: u32 = 0x5865F2;

/// Filename the generated image is attached under; the embed references it by name.
pub const IMAGE_FILENAME: &str = "image.png";

/// Title shown above every generated image
pub const IMAGE_EMBED_TITLE: &str = "AI Image Generation Result";

/// Wrap a prompt in a code block for embed descriptions, leaving room for the fences
pub fn prompt_block(prompt: &str) -> String {
    format!("```{}```", truncate_to(prompt, EMBED_LIMIT - 6))
}

/// Footer text with the wall-clock time spent on the request
pub fn elapsed_footer(elapsed: Duration) -> String {
    format!(
        "Cloudflare AI | Elapsed time: {:.2} seconds",
        elapsed.as_secs_f64()
    )
}

/// Build the embed that accompanies a generated image attachment.
///
/// The image itself is sent as an attachment named [`IMAGE_FILENAME`] on the same message.
pub fn image_result_embed(prompt: &str, elapsed: Duration, created_at: Timestamp) -> CreateEmbed {
    let mut embed = CreateEmbed::default();
    embed.color(BLURPLE);
    embed.title(IMAGE_EMBED_TITLE);
    embed.description(prompt_block(prompt));
    embed.image(format!("attachment://{IMAGE_FILENAME}"));
    embed.timestamp(created_at);
    embed.footer(|f| f.text(elapsed_footer(elapsed)));
    embed
}
