//! # Feature: Workers AI
//!
//! Authenticated calls to the Cloudflare Workers AI REST API, one per capability.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod client;
pub mod models;

pub use client::{
    AiResponse, Classification, Transcription, WorkersAi, WorkersAiClient, WorkersAiError,
};
pub use models::{
    ImageClassificationModel, Language, SpeechRecognitionModel, TextGenerationModel,
    TextToImageModel, TranslationModel, LANGUAGE_CHOICES,
};
