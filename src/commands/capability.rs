//! Static capability table
//!
//! Every AI operation the bot exposes, its subcommand name, and its cooldown.
//! Dispatch matches on this enum, so adding a capability is a compile-time change.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use std::time::Duration;

/// Heaviest capabilities allow one invocation per this window per (guild, user)
pub const HEAVY_COOLDOWN: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ImageGeneration,
    TextGeneration,
    ImageClassification,
    SpeechRecognition,
    Translation,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::ImageGeneration,
        Capability::TextGeneration,
        Capability::ImageClassification,
        Capability::SpeechRecognition,
        Capability::Translation,
    ];

    /// Subcommand name under `/cloudflareai`
    pub fn name(&self) -> &'static str {
        match self {
            Capability::ImageGeneration => "image_generation",
            Capability::TextGeneration => "text_generation",
            Capability::ImageClassification => "image_classification",
            Capability::SpeechRecognition => "speech_recognition",
            Capability::Translation => "translation",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Capability::ImageGeneration => "Generate an image from a given text.",
            Capability::TextGeneration => "Generate text from a given prompt.",
            Capability::ImageClassification => "Classify an image.",
            Capability::SpeechRecognition => "Recognize speech from an audio file.",
            Capability::Translation => "Translate a given text.",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// One call per window per (guild, user); `None` means unlimited
    pub fn cooldown(&self) -> Option<Duration> {
        match self {
            Capability::ImageGeneration | Capability::TextGeneration => Some(HEAVY_COOLDOWN),
            _ => None,
        }
    }
}
