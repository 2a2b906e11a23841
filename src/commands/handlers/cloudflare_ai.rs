//! Workers AI command handlers
//!
//! Handles: /cloudflareai image_generation, text_generation, image_classification,
//! speech_recognition, translation
//!
//! Each capability is a pure transform from validated arguments to one [`Reply`]:
//! one remote call, a branch on its status, no retries. The
//! [`SlashCommandHandler`] impl wraps that with cooldowns, deferral and delivery.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::interaction::application_command::{
    ApplicationCommandInteraction, CommandDataOption,
};
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::Attachment;
use serenity::prelude::Context;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::commands::capability::Capability;
use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::reply::{self, format_classifications, Reply};
use crate::commands::slash::cloudflare_ai::{self as definitions, DEFAULT_SYSTEM_PROMPT, GROUP_COMMAND};
use crate::commands::slash::{get_attachment_option, get_string_option, get_subcommand};
use crate::features::rate_limiting::CooldownKey;
use crate::features::workers_ai::{
    AiResponse, ImageClassificationModel, Language, SpeechRecognitionModel, TextGenerationModel,
    TextToImageModel, TranslationModel, WorkersAi, WorkersAiError,
};

/// Validated arguments for one capability invocation.
///
/// Attachments are already downloaded in full.
#[derive(Debug, Clone, PartialEq)]
pub enum AiRequest {
    ImageGeneration {
        text: String,
    },
    TextGeneration {
        user_prompt: String,
        model: TextGenerationModel,
        system_prompt: String,
    },
    ImageClassification {
        image: Vec<u8>,
    },
    SpeechRecognition {
        audio: Vec<u8>,
    },
    Translation {
        text: String,
        source: Language,
        target: Language,
    },
}

impl AiRequest {
    pub fn capability(&self) -> Capability {
        match self {
            AiRequest::ImageGeneration { .. } => Capability::ImageGeneration,
            AiRequest::TextGeneration { .. } => Capability::TextGeneration,
            AiRequest::ImageClassification { .. } => Capability::ImageClassification,
            AiRequest::SpeechRecognition { .. } => Capability::SpeechRecognition,
            AiRequest::Translation { .. } => Capability::Translation,
        }
    }
}

/// Run one request against Workers AI and render the single reply
pub async fn run(ai: &dyn WorkersAi, request: AiRequest, request_id: Uuid) -> Reply {
    let capability = request.capability();
    match request {
        AiRequest::ImageGeneration { text } => {
            let start = Instant::now();
            let outcome = ai
                .text_to_image(&text, TextToImageModel::StableDiffusionXlBase)
                .await;
            settle(capability, request_id, outcome, |image| Reply::Image {
                prompt: text,
                image,
                elapsed: start.elapsed(),
            })
        }
        AiRequest::TextGeneration {
            user_prompt,
            model,
            system_prompt,
        } => {
            let outcome = ai
                .text_generation(&user_prompt, &system_prompt, model)
                .await;
            settle(capability, request_id, outcome, Reply::Text)
        }
        AiRequest::ImageClassification { image } => {
            let outcome = ai
                .image_classification(image, ImageClassificationModel::Resnet50)
                .await;
            settle(capability, request_id, outcome, |labels| {
                Reply::Text(format_classifications(&labels))
            })
        }
        AiRequest::SpeechRecognition { audio } => {
            let outcome = ai
                .speech_recognition(audio, SpeechRecognitionModel::Whisper)
                .await;
            settle(capability, request_id, outcome, |transcription| {
                if transcription.text.trim().is_empty() {
                    Reply::Text("No speech was recognized in this file.".to_string())
                } else {
                    Reply::Text(transcription.text)
                }
            })
        }
        AiRequest::Translation {
            text,
            source,
            target,
        } => {
            let outcome = ai
                .translation(&text, source, target, TranslationModel::M2m100)
                .await;
            settle(capability, request_id, outcome, Reply::Text)
        }
    }
}

/// Turn a client outcome into a reply, logging every failure exactly once
fn settle<T>(
    capability: Capability,
    request_id: Uuid,
    outcome: Result<AiResponse<T>, WorkersAiError>,
    render: impl FnOnce(T) -> Reply,
) -> Reply {
    match outcome {
        Ok(response) if response.is_ok() => match response.result {
            Some(result) => render(result),
            None => {
                error!(
                    "[{request_id}] {} returned 200 without a result",
                    capability.name()
                );
                Reply::Failure
            }
        },
        Ok(response) => {
            error!(
                "[{request_id}] The Cloudflare AI returned an error for {}: {} {}",
                capability.name(),
                response.status_code,
                response.reason
            );
            Reply::api_error(&response)
        }
        Err(e) => {
            error!(
                "[{request_id}] An error occurred in {}: {}: {e}",
                capability.name(),
                e.kind()
            );
            Reply::Failure
        }
    }
}

/// Arguments as collected before the interaction is deferred.
/// Attachments are downloaded only after deferral.
enum Pending {
    Ready(AiRequest),
    Image(Attachment),
    Audio(Attachment),
}

impl Pending {
    fn capability(&self) -> Capability {
        match self {
            Pending::Ready(request) => request.capability(),
            Pending::Image(_) => Capability::ImageClassification,
            Pending::Audio(_) => Capability::SpeechRecognition,
        }
    }
}

/// How the reply reaches Discord
#[derive(Debug, PartialEq)]
enum Delivery {
    /// Answered straight away; no remote call was made
    Immediate(Reply),
    /// Fills in the deferred response
    Deferred(Reply),
}

/// Collect the arguments for a capability from its subcommand options
fn collect_arguments(capability: Capability, options: &[CommandDataOption]) -> Result<Pending> {
    let required = |name: &str| {
        get_string_option(options, name)
            .ok_or_else(|| anyhow::anyhow!("Missing {name} parameter"))
    };

    let pending = match capability {
        Capability::ImageGeneration => Pending::Ready(AiRequest::ImageGeneration {
            text: required("text")?,
        }),
        Capability::TextGeneration => {
            let model_id = required("model")?;
            let model = TextGenerationModel::parse(&model_id)
                .ok_or_else(|| anyhow::anyhow!("Unknown text generation model: {model_id}"))?;
            Pending::Ready(AiRequest::TextGeneration {
                user_prompt: required("user_prompt")?,
                model,
                system_prompt: get_string_option(options, "system_prompt")
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            })
        }
        Capability::ImageClassification => Pending::Image(
            get_attachment_option(options, "image")
                .ok_or_else(|| anyhow::anyhow!("Missing image attachment"))?,
        ),
        Capability::SpeechRecognition => Pending::Audio(
            get_attachment_option(options, "audio_file")
                .ok_or_else(|| anyhow::anyhow!("Missing audio_file attachment"))?,
        ),
        Capability::Translation => {
            let language = |name: &str| -> Result<Language> {
                let value = required(name)?;
                Language::parse(&value).ok_or_else(|| anyhow::anyhow!("Unknown language: {value}"))
            };
            Pending::Ready(AiRequest::Translation {
                text: required("text")?,
                source: language("source_language")?,
                target: language("target_language")?,
            })
        }
    };
    Ok(pending)
}

/// Download an attachment in full before it is forwarded
async fn download(attachment: &Attachment, request_id: Uuid) -> Option<Vec<u8>> {
    debug!(
        "[{request_id}] Downloading attachment {} ({} bytes)",
        attachment.filename, attachment.size
    );
    match attachment.download().await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            error!(
                "[{request_id}] Failed to download attachment {}: {e}",
                attachment.filename
            );
            None
        }
    }
}

/// Gate on the caller's cooldown, defer, then make the single remote call.
///
/// A caller still cooling down gets an immediate notice and `defer` is never
/// run.
async fn invoke<D, F>(
    ctx: &CommandContext,
    caller: CooldownKey,
    pending: Pending,
    request_id: Uuid,
    defer: D,
) -> Result<Delivery>
where
    D: FnOnce() -> F,
    F: Future<Output = Result<()>>,
{
    let capability = pending.capability();
    let (guild_id, user_id) = caller;

    if let Err(retry_after) = ctx.check_cooldown(capability, guild_id, user_id) {
        warn!(
            "[{request_id}] {} on cooldown for user {user_id} ({retry_after:?} left)",
            capability.name()
        );
        return Ok(Delivery::Immediate(Reply::Cooldown { retry_after }));
    }

    // Workers AI calls routinely exceed the 3 second interaction deadline
    defer().await?;

    let request = match pending {
        Pending::Ready(request) => Some(request),
        Pending::Image(attachment) => download(&attachment, request_id)
            .await
            .map(|image| AiRequest::ImageClassification { image }),
        Pending::Audio(attachment) => download(&attachment, request_id)
            .await
            .map(|audio| AiRequest::SpeechRecognition { audio }),
    };

    let reply = match request {
        Some(request) => run(ctx.ai.as_ref(), request, request_id).await,
        None => Reply::Failure,
    };

    info!(
        "[{request_id}] {} finished | Outcome: {}",
        capability.name(),
        reply.outcome()
    );
    Ok(Delivery::Deferred(reply))
}

/// Handler for the `/cloudflareai` command group
pub struct CloudflareAiHandler;

#[async_trait]
impl SlashCommandHandler for CloudflareAiHandler {
    fn group_name(&self) -> &'static str {
        "cloudflareai"
    }

    fn command_names(&self) -> &'static [&'static str] {
        &[GROUP_COMMAND]
    }

    fn create_commands(&self) -> Vec<CreateApplicationCommand> {
        definitions::create_commands()
    }

    fn load(&self, ctx: &CommandContext) -> Result<()> {
        if ctx.config.cloudflare_api_key.is_none() || ctx.config.cloudflare_account_id.is_none() {
            warn!("Cloudflare credentials missing - /cloudflareai commands will report failures");
        }
        Ok(())
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let request_id = Uuid::new_v4();
        let (name, options) = get_subcommand(&command.data.options)
            .ok_or_else(|| anyhow::anyhow!("Missing subcommand for /{GROUP_COMMAND}"))?;
        let capability = Capability::parse(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown subcommand: {name}"))?;

        let caller = (command.guild_id.map(|id| id.0), command.user.id.0);
        info!(
            "[{request_id}] /{GROUP_COMMAND} {} | User: {} | Guild: {}",
            capability.name(),
            caller.1,
            caller.0.map_or_else(|| "DM".to_string(), |g| g.to_string())
        );

        let pending = collect_arguments(capability, options)?;

        let http = &serenity_ctx.http;
        let defer = move || async move {
            command
                .create_interaction_response(http, |response| {
                    response.kind(InteractionResponseType::DeferredChannelMessageWithSource)
                })
                .await
                .map_err(|e| {
                    error!("[{request_id}] Failed to defer interaction response: {e}");
                    anyhow::anyhow!("Failed to defer interaction: {}", e)
                })
        };

        match invoke(&ctx, caller, pending, request_id, defer).await? {
            Delivery::Immediate(reply) => reply::respond(serenity_ctx, command, &reply).await,
            Delivery::Deferred(reply) => reply::deliver(serenity_ctx, command, reply).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::test_support::{test_config, Canned, MockAi};
    use crate::features::workers_ai::client::test_support::{local_client, serve_once};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn text_generation(prompt: &str) -> AiRequest {
        AiRequest::TextGeneration {
            user_prompt: prompt.to_string(),
            model: TextGenerationModel::MistralInstruct,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    fn all_requests() -> Vec<AiRequest> {
        vec![
            AiRequest::ImageGeneration {
                text: "a cat".to_string(),
            },
            text_generation("Hello"),
            AiRequest::ImageClassification {
                image: vec![1, 2, 3],
            },
            AiRequest::SpeechRecognition {
                audio: vec![4, 5, 6],
            },
            AiRequest::Translation {
                text: "hello".to_string(),
                source: Language::parse("english").unwrap(),
                target: Language::parse("french").unwrap(),
            },
        ]
    }

    #[tokio::test]
    async fn test_text_generation_success_shows_text() {
        let ai = MockAi::new(Canned::Ok);
        let reply = run(&ai, text_generation("Hello"), Uuid::new_v4()).await;

        assert_eq!(reply, Reply::Text("Hi there".to_string()));
        assert_eq!(reply.content().as_deref(), Some("Hi there"));
        assert_eq!(ai.calls(), 1);
    }

    #[tokio::test]
    async fn test_image_generation_error_has_no_file() {
        let ai = MockAi::new(Canned::Status(500, "Internal Error"));
        let reply = run(
            &ai,
            AiRequest::ImageGeneration {
                text: "a cat".to_string(),
            },
            Uuid::new_v4(),
        )
        .await;

        let content = reply.content().unwrap();
        assert!(content.contains("500"));
        assert!(content.contains("Internal Error"));
        assert!(!reply.has_attachment());
        assert_eq!(ai.calls(), 1);
    }

    #[tokio::test]
    async fn test_image_generation_success_attaches_image() {
        let ai = MockAi::new(Canned::Ok);
        let reply = run(
            &ai,
            AiRequest::ImageGeneration {
                text: "a cat".to_string(),
            },
            Uuid::new_v4(),
        )
        .await;

        match reply {
            Reply::Image { prompt, image, .. } => {
                assert_eq!(prompt, "a cat");
                assert!(!image.is_empty());
            }
            other => panic!("expected image reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_every_capability_success_shape() {
        for request in all_requests() {
            let capability = request.capability();
            let ai = MockAi::new(Canned::Ok);
            let reply = run(&ai, request, Uuid::new_v4()).await;

            assert_eq!(ai.calls(), 1, "{capability:?} made more than one call");
            match capability {
                Capability::ImageGeneration => assert_eq!(reply.outcome(), "image"),
                _ => assert_eq!(reply.outcome(), "text", "{capability:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_every_capability_non_200_is_single_error_without_retry() {
        for request in all_requests() {
            let ai = MockAi::new(Canned::Status(429, "Too Many Requests"));
            let reply = run(&ai, request, Uuid::new_v4()).await;

            assert_eq!(
                reply,
                Reply::ApiError {
                    status_code: 429,
                    reason: "Too Many Requests".to_string()
                }
            );
            assert_eq!(ai.calls(), 1);
        }
    }

    #[tokio::test]
    async fn test_every_capability_client_error_is_generic_failure() {
        for request in all_requests() {
            let ai = MockAi::new(Canned::Error);
            let reply = run(&ai, request, Uuid::new_v4()).await;

            assert_eq!(reply, Reply::Failure);
            assert_eq!(
                reply.content().as_deref(),
                Some("An error occurred, please try again later")
            );
            assert_eq!(ai.calls(), 1);
        }
    }

    #[tokio::test]
    async fn test_missing_api_key_surfaces_generic_failure() {
        use crate::features::workers_ai::WorkersAiClient;

        let client = WorkersAiClient::new(None, None).unwrap();
        let reply = run(&client, text_generation("Hello"), Uuid::new_v4()).await;
        assert_eq!(reply, Reply::Failure);
    }

    #[tokio::test]
    async fn test_transcription_text_is_reply() {
        let ai = MockAi::new(Canned::Ok);
        let reply = run(
            &ai,
            AiRequest::SpeechRecognition { audio: vec![0; 16] },
            Uuid::new_v4(),
        )
        .await;
        assert_eq!(reply, Reply::Text("hello world".to_string()));
    }

    #[test]
    fn test_ok_without_result_is_failure() {
        let reply = settle::<String>(
            Capability::Translation,
            Uuid::new_v4(),
            Ok(AiResponse {
                status_code: 200,
                reason: "OK".to_string(),
                result: None,
            }),
            Reply::Text,
        );
        assert_eq!(reply, Reply::Failure);
    }

    fn options(value: serde_json::Value) -> Vec<CommandDataOption> {
        serde_json::from_value(value).expect("valid options json")
    }

    #[test]
    fn test_collect_text_generation_defaults_system_prompt() {
        let opts = options(json!([
            {"name": "user_prompt", "type": 3, "value": "Hello"},
            {"name": "model", "type": 3, "value": "@cf/meta/llama-2-7b-chat-int8"}
        ]));

        match collect_arguments(Capability::TextGeneration, &opts).unwrap() {
            Pending::Ready(AiRequest::TextGeneration {
                user_prompt,
                model,
                system_prompt,
            }) => {
                assert_eq!(user_prompt, "Hello");
                assert_eq!(model, TextGenerationModel::Llama2ChatInt8);
                assert_eq!(system_prompt, DEFAULT_SYSTEM_PROMPT);
            }
            _ => panic!("expected text generation request"),
        }
    }

    #[test]
    fn test_collect_rejects_unknown_model() {
        let opts = options(json!([
            {"name": "user_prompt", "type": 3, "value": "Hello"},
            {"name": "model", "type": 3, "value": "gpt-4"}
        ]));
        assert!(collect_arguments(Capability::TextGeneration, &opts).is_err());
    }

    #[test]
    fn test_collect_translation_languages() {
        let opts = options(json!([
            {"name": "text", "type": 3, "value": "hello"},
            {"name": "source_language", "type": 3, "value": "english"},
            {"name": "target_language", "type": 3, "value": "french"}
        ]));

        match collect_arguments(Capability::Translation, &opts).unwrap() {
            Pending::Ready(AiRequest::Translation { source, target, .. }) => {
                assert_eq!(source.as_str(), "english");
                assert_eq!(target.as_str(), "french");
            }
            _ => panic!("expected translation request"),
        }
    }

    #[test]
    fn test_collect_missing_attachment_is_error() {
        let opts = options(json!([]));
        assert!(collect_arguments(Capability::SpeechRecognition, &opts).is_err());
        assert!(collect_arguments(Capability::ImageClassification, &opts).is_err());
    }

    #[test]
    fn test_handler_commands() {
        let handler = CloudflareAiHandler;
        assert_eq!(handler.command_names(), &["cloudflareai"]);
        assert_eq!(handler.create_commands().len(), 1);
    }

    #[tokio::test]
    async fn test_second_call_in_window_is_cooldown_without_remote_call() {
        let ai = Arc::new(MockAi::new(Canned::Ok));
        let ctx = CommandContext::new(test_config(), ai.clone());
        let defers = AtomicUsize::new(0);
        let defer = || {
            defers.fetch_add(1, Ordering::SeqCst);
            async { Ok::<(), anyhow::Error>(()) }
        };

        let first = invoke(
            &ctx,
            (Some(1), 10),
            Pending::Ready(text_generation("Hello")),
            Uuid::new_v4(),
            defer,
        )
        .await
        .unwrap();
        assert_eq!(first, Delivery::Deferred(Reply::Text("Hi there".to_string())));

        let second = invoke(
            &ctx,
            (Some(1), 10),
            Pending::Ready(text_generation("Hello again")),
            Uuid::new_v4(),
            defer,
        )
        .await
        .unwrap();
        match second {
            Delivery::Immediate(Reply::Cooldown { retry_after }) => {
                assert!(retry_after <= Duration::from_secs(5));
            }
            other => panic!("expected cooldown notice, got {other:?}"),
        }
        assert_eq!(ai.calls(), 1);
        assert_eq!(defers.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_user_is_not_blocked_by_cooldown() {
        let ai = Arc::new(MockAi::new(Canned::Ok));
        let ctx = CommandContext::new(test_config(), ai.clone());
        let defer = || async { Ok::<(), anyhow::Error>(()) };

        for user_id in [10, 11] {
            let delivery = invoke(
                &ctx,
                (Some(1), user_id),
                Pending::Ready(AiRequest::ImageGeneration {
                    text: "a cat".to_string(),
                }),
                Uuid::new_v4(),
                defer,
            )
            .await
            .unwrap();
            assert!(matches!(delivery, Delivery::Deferred(Reply::Image { .. })));
        }
        assert_eq!(ai.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_defer_skips_remote_call() {
        let ai = Arc::new(MockAi::new(Canned::Ok));
        let ctx = CommandContext::new(test_config(), ai.clone());

        let result = invoke(
            &ctx,
            (None, 10),
            Pending::Ready(text_generation("Hello")),
            Uuid::new_v4(),
            || async { Err::<(), _>(anyhow::anyhow!("Unknown interaction")) },
        )
        .await;
        assert!(result.is_err());
        assert_eq!(ai.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_content_status_is_api_error_reply() {
        let (base_url, _server) = serve_once("204 No Content", "", Vec::new()).await;
        let client = local_client(&base_url);

        let reply = run(
            &client,
            AiRequest::Translation {
                text: "hello".to_string(),
                source: Language::parse("english").unwrap(),
                target: Language::parse("french").unwrap(),
            },
            Uuid::new_v4(),
        )
        .await;
        assert_eq!(
            reply,
            Reply::ApiError {
                status_code: 204,
                reason: "No Content".to_string()
            }
        );
        assert!(reply.content().unwrap().contains("204"));
    }

    #[tokio::test]
    async fn test_server_error_through_client_is_api_error_reply() {
        let (base_url, _server) = serve_once(
            "500 Internal Server Error",
            "application/json",
            br#"{"success":false}"#.to_vec(),
        )
        .await;
        let client = local_client(&base_url);

        let reply = run(
            &client,
            AiRequest::ImageGeneration {
                text: "a cat".to_string(),
            },
            Uuid::new_v4(),
        )
        .await;
        assert_eq!(reply.outcome(), "api_error");
        assert!(!reply.has_attachment());
        assert!(reply.content().unwrap().contains("500 Internal Server Error"));
    }
}
