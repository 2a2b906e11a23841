//! Cloudflare Workers AI REST client
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Text-to-image, text generation, image classification, speech recognition, translation

use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::models::{
    ImageClassificationModel, Language, SpeechRecognitionModel, TextGenerationModel,
    TextToImageModel, TranslationModel,
};

pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Whole-request timeout; image generation routinely takes tens of seconds.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error)]
pub enum WorkersAiError {
    #[error("Cloudflare credentials not configured: {0} is missing")]
    MissingCredentials(&'static str),
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected response from Workers AI: {0}")]
    Decode(String),
}

impl WorkersAiError {
    /// Short name of the error kind for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            WorkersAiError::MissingCredentials(_) => "MissingCredentials",
            WorkersAiError::Transport(_) => "Transport",
            WorkersAiError::Decode(_) => "Decode",
        }
    }
}

/// Outcome of one Workers AI call.
///
/// Any status other than 200 is a value, not an error: `result` is `None` and
/// the status and reason describe what went wrong. The body is not decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct AiResponse<T> {
    pub status_code: u16,
    pub reason: String,
    pub result: Option<T>,
}

impl<T> AiResponse<T> {
    pub fn ok(result: T) -> Self {
        AiResponse {
            status_code: 200,
            reason: "OK".to_string(),
            result: Some(result),
        }
    }

    pub fn failed(status_code: u16, reason: impl Into<String>) -> Self {
        AiResponse {
            status_code,
            reason: reason.into(),
            result: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transcription {
    pub text: String,
    #[serde(default)]
    pub word_count: Option<u64>,
}

/// One method per Workers AI capability.
///
/// Implementations hold only credentials and a connection pool, so a single
/// instance is shared by every concurrent command invocation.
#[async_trait]
pub trait WorkersAi: Send + Sync {
    async fn text_to_image(
        &self,
        prompt: &str,
        model: TextToImageModel,
    ) -> Result<AiResponse<Vec<u8>>, WorkersAiError>;

    async fn text_generation(
        &self,
        prompt: &str,
        system_prompt: &str,
        model: TextGenerationModel,
    ) -> Result<AiResponse<String>, WorkersAiError>;

    async fn image_classification(
        &self,
        image: Vec<u8>,
        model: ImageClassificationModel,
    ) -> Result<AiResponse<Vec<Classification>>, WorkersAiError>;

    async fn speech_recognition(
        &self,
        audio: Vec<u8>,
        model: SpeechRecognitionModel,
    ) -> Result<AiResponse<Transcription>, WorkersAiError>;

    async fn translation(
        &self,
        text: &str,
        source: Language,
        target: Language,
        model: TranslationModel,
    ) -> Result<AiResponse<String>, WorkersAiError>;
}

// Wire types

#[derive(Serialize)]
struct PromptRequest<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct TranslationRequest<'a> {
    text: &'a str,
    source_lang: &'a str,
    target_lang: &'a str,
}

#[derive(Deserialize)]
struct Envelope<T> {
    result: Option<T>,
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct TextGenerationResult {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TranslationResult {
    translated_text: String,
}

/// Unwrap the `{"result": ..., "errors": [...]}` envelope Workers AI returns for JSON models
pub(crate) fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T, WorkersAiError> {
    let envelope: Envelope<T> =
        serde_json::from_slice(body).map_err(|e| WorkersAiError::Decode(e.to_string()))?;

    match envelope.result {
        Some(result) => Ok(result),
        None => {
            let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
            Err(WorkersAiError::Decode(if messages.is_empty() {
                "missing result".to_string()
            } else {
                messages.join("; ")
            }))
        }
    }
}

/// `{base}/accounts/{account}/ai/run/{model}`
pub(crate) fn run_url(base_url: &str, account_id: &str, model_id: &str) -> String {
    format!(
        "{}/accounts/{}/ai/run/{}",
        base_url.trim_end_matches('/'),
        account_id,
        model_id
    )
}

fn reason_phrase(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown").to_string()
}

enum Body<'a, B: Serialize> {
    Json(&'a B),
    Bytes(Vec<u8>),
}

#[derive(Clone)]
pub struct WorkersAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    account_id: Option<String>,
    base_url: String,
}

impl WorkersAiClient {
    pub fn new(
        api_key: Option<String>,
        account_id: Option<String>,
    ) -> Result<Self, WorkersAiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("cloudflare-ai-bot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(WorkersAiClient {
            http,
            api_key,
            account_id,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send one request to a model and return the raw status and body.
    ///
    /// Credentials are checked here rather than at construction so the bot can
    /// start without them.
    async fn run<B: Serialize>(
        &self,
        model_id: &str,
        body: Body<'_, B>,
    ) -> Result<(StatusCode, Vec<u8>), WorkersAiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(WorkersAiError::MissingCredentials("CLOUDFLARE_API_KEY"))?;
        let account_id = self
            .account_id
            .as_deref()
            .ok_or(WorkersAiError::MissingCredentials("CLOUDFLARE_ACCOUNT_IDENTIFIER"))?;

        let url = run_url(&self.base_url, account_id, model_id);
        debug!("POST {url}");

        let request = self.http.post(&url).bearer_auth(api_key);
        let request = match body {
            Body::Json(json) => request.json(json),
            Body::Bytes(bytes) => request
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(bytes),
        };

        let response = request.send().await?;
        let status = response.status();
        // Read the whole body before the connection is released
        let bytes = response.bytes().await?.to_vec();

        debug!("Workers AI {model_id} -> {status} ({} bytes)", bytes.len());
        Ok((status, bytes))
    }

    async fn run_json<B: Serialize, T: DeserializeOwned>(
        &self,
        model_id: &str,
        body: Body<'_, B>,
    ) -> Result<AiResponse<T>, WorkersAiError> {
        let (status, bytes) = self.run(model_id, body).await?;
        if status != StatusCode::OK {
            return Ok(AiResponse::failed(status.as_u16(), reason_phrase(status)));
        }
        let result = decode_envelope::<T>(&bytes)?;
        Ok(AiResponse {
            status_code: status.as_u16(),
            reason: reason_phrase(status),
            result: Some(result),
        })
    }
}

#[async_trait]
impl WorkersAi for WorkersAiClient {
    async fn text_to_image(
        &self,
        prompt: &str,
        model: TextToImageModel,
    ) -> Result<AiResponse<Vec<u8>>, WorkersAiError> {
        let body = PromptRequest { prompt };
        let (status, bytes) = self.run(model.model_id(), Body::Json(&body)).await?;
        if status != StatusCode::OK {
            return Ok(AiResponse::failed(status.as_u16(), reason_phrase(status)));
        }
        Ok(AiResponse {
            status_code: status.as_u16(),
            reason: reason_phrase(status),
            result: Some(bytes),
        })
    }

    async fn text_generation(
        &self,
        prompt: &str,
        system_prompt: &str,
        model: TextGenerationModel,
    ) -> Result<AiResponse<String>, WorkersAiError> {
        let body = ChatRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };
        let response: AiResponse<TextGenerationResult> =
            self.run_json(model.model_id(), Body::Json(&body)).await?;
        Ok(AiResponse {
            status_code: response.status_code,
            reason: response.reason,
            result: response.result.map(|r| r.response),
        })
    }

    async fn image_classification(
        &self,
        image: Vec<u8>,
        model: ImageClassificationModel,
    ) -> Result<AiResponse<Vec<Classification>>, WorkersAiError> {
        self.run_json::<(), _>(model.model_id(), Body::Bytes(image))
            .await
    }

    async fn speech_recognition(
        &self,
        audio: Vec<u8>,
        model: SpeechRecognitionModel,
    ) -> Result<AiResponse<Transcription>, WorkersAiError> {
        self.run_json::<(), _>(model.model_id(), Body::Bytes(audio))
            .await
    }

    async fn translation(
        &self,
        text: &str,
        source: Language,
        target: Language,
        model: TranslationModel,
    ) -> Result<AiResponse<String>, WorkersAiError> {
        let body = TranslationRequest {
            text,
            source_lang: source.as_str(),
            target_lang: target.as_str(),
        };
        let response: AiResponse<TranslationResult> =
            self.run_json(model.model_id(), Body::Json(&body)).await?;
        Ok(AiResponse {
            status_code: response.status_code,
            reason: response.reason,
            result: response.result.map(|r| r.translated_text),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::WorkersAiClient;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// One request as seen by [`serve_once`]
    pub struct Captured {
        /// Request line and headers, lowercased
        pub head: String,
        pub body: Vec<u8>,
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    /// Accept a single connection on a local port, answer it with `status`
    /// and `body`, and hand back what the client sent.
    pub async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: Vec<u8>,
    ) -> (String, JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            let head_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before headers");
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = find(&buf, b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < head_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before body");
                buf.extend_from_slice(&chunk[..n]);
            }

            let mut response = format!("HTTP/1.1 {status}\r\nConnection: close\r\n");
            if !status.starts_with("204") {
                response.push_str(&format!(
                    "Content-Type: {content_type}\r\nContent-Length: {}\r\n",
                    body.len()
                ));
            }
            response.push_str("\r\n");
            let mut response = response.into_bytes();
            response.extend_from_slice(&body);
            socket.write_all(&response).await.unwrap();
            socket.shutdown().await.ok();

            Captured {
                body: buf[head_end..head_end + content_length].to_vec(),
                head,
            }
        });

        (base_url, handle)
    }

    /// A client with test credentials pointed at `base_url`, bypassing any proxy
    pub fn local_client(base_url: &str) -> WorkersAiClient {
        WorkersAiClient {
            http: reqwest::Client::builder().no_proxy().build().unwrap(),
            api_key: Some("test-key".to_string()),
            account_id: Some("acct".to_string()),
            base_url: String::new(),
        }
        .with_base_url(base_url)
    }
}
