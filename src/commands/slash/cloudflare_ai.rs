//! # Cloudflare AI Command
//!
//! `/cloudflareai` with one subcommand per Workers AI capability.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Initial implementation

use serenity::builder::{CreateApplicationCommand, CreateApplicationCommandOption};
use serenity::model::application::command::CommandOptionType;

use crate::commands::capability::Capability;
use crate::features::workers_ai::{TextGenerationModel, LANGUAGE_CHOICES};

pub const GROUP_COMMAND: &str = "cloudflareai";

/// Default system prompt when `text_generation` is invoked without one
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an AI assistant, you are very helpful.";

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_cloudflare_ai_command()]
}

fn create_cloudflare_ai_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name(GROUP_COMMAND)
        .description("Interact with the Cloudflare Workers AI models");

    for capability in Capability::ALL {
        command.create_option(|subcommand| {
            subcommand
                .name(capability.name())
                .description(capability.description())
                .kind(CommandOptionType::SubCommand);
            add_capability_options(capability, subcommand);
            subcommand
        });
    }
    command
}

fn add_capability_options(capability: Capability, subcommand: &mut CreateApplicationCommandOption) {
    match capability {
        Capability::ImageGeneration => {
            subcommand.create_sub_option(|o| {
                o.name("text")
                    .description("The text to generate an image from.")
                    .kind(CommandOptionType::String)
                    .required(true)
                    .min_length(1)
                    .max_length(2000)
            });
        }
        Capability::TextGeneration => {
            subcommand.create_sub_option(|o| {
                o.name("user_prompt")
                    .description("The user prompt to use for text generation")
                    .kind(CommandOptionType::String)
                    .required(true)
                    .min_length(1)
                    .max_length(2000)
            });
            subcommand.create_sub_option(|o| {
                o.name("model")
                    .description("The model to use for text generation.")
                    .kind(CommandOptionType::String)
                    .required(true);
                for model in TextGenerationModel::ALL {
                    o.add_string_choice(model.display_name(), model.model_id());
                }
                o
            });
            subcommand.create_sub_option(|o| {
                o.name("system_prompt")
                    .description("The system prompt to use.")
                    .kind(CommandOptionType::String)
                    .required(false)
                    .max_length(2000)
            });
        }
        Capability::ImageClassification => {
            subcommand.create_sub_option(|o| {
                o.name("image")
                    .description("The image to classify.")
                    .kind(CommandOptionType::Attachment)
                    .required(true)
            });
        }
        Capability::SpeechRecognition => {
            subcommand.create_sub_option(|o| {
                o.name("audio_file")
                    .description("The audio file to recognize speech from.")
                    .kind(CommandOptionType::Attachment)
                    .required(true)
            });
        }
        Capability::Translation => {
            subcommand.create_sub_option(|o| {
                o.name("text")
                    .description("The text to translate.")
                    .kind(CommandOptionType::String)
                    .required(true)
                    .min_length(1)
                    .max_length(2000)
            });
            for (name, description) in [
                ("source_language", "The source language."),
                ("target_language", "The target language."),
            ] {
                subcommand.create_sub_option(|o| {
                    o.name(name)
                        .description(description)
                        .kind(CommandOptionType::String)
                        .required(true);
                    for (label, value) in LANGUAGE_CHOICES {
                        o.add_string_choice(label, value);
                    }
                    o
                });
            }
        }
    }
}
