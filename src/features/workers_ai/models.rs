//! Workers AI model and language catalogue
//!
//! Each capability has its own model enum so a handler can only pass a model
//! of the matching family. Display names double as slash-command choice labels.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Stable Diffusion XL, Llama 2 / Mistral / CodeLlama, ResNet-50, Whisper, M2M100

/// Text-to-image models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextToImageModel {
    StableDiffusionXlBase,
}

impl TextToImageModel {
    pub fn model_id(&self) -> &'static str {
        match self {
            TextToImageModel::StableDiffusionXlBase => "@cf/stabilityai/stable-diffusion-xl-base-1.0",
        }
    }
}

/// Text generation models offered as a required choice on `text_generation`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextGenerationModel {
    Llama2ChatFp16,
    Llama2ChatInt8,
    MistralInstruct,
    CodeLlamaInstructAwq,
}

impl TextGenerationModel {
    pub const ALL: [TextGenerationModel; 4] = [
        TextGenerationModel::Llama2ChatFp16,
        TextGenerationModel::Llama2ChatInt8,
        TextGenerationModel::MistralInstruct,
        TextGenerationModel::CodeLlamaInstructAwq,
    ];

    pub fn model_id(&self) -> &'static str {
        match self {
            TextGenerationModel::Llama2ChatFp16 => "@cf/meta/llama-2-7b-chat-fp16",
            TextGenerationModel::Llama2ChatInt8 => "@cf/meta/llama-2-7b-chat-int8",
            TextGenerationModel::MistralInstruct => "@cf/mistral/mistral-7b-instruct-v0.1",
            TextGenerationModel::CodeLlamaInstructAwq => "@hf/thebloke/codellama-7b-instruct-awq",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TextGenerationModel::Llama2ChatFp16 => "Llama 2 7B Chat (fp16)",
            TextGenerationModel::Llama2ChatInt8 => "Llama 2 7B Chat (int8)",
            TextGenerationModel::MistralInstruct => "Mistral 7B Instruct",
            TextGenerationModel::CodeLlamaInstructAwq => "CodeLlama 7B Instruct (AWQ)",
        }
    }

    /// Parse a choice value (the model id)
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.model_id() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageClassificationModel {
    Resnet50,
}

impl ImageClassificationModel {
    pub fn model_id(&self) -> &'static str {
        match self {
            ImageClassificationModel::Resnet50 => "@cf/microsoft/resnet-50",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechRecognitionModel {
    Whisper,
}

impl SpeechRecognitionModel {
    pub fn model_id(&self) -> &'static str {
        match self {
            SpeechRecognitionModel::Whisper => "@cf/openai/whisper",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationModel {
    M2m100,
}

impl TranslationModel {
    pub fn model_id(&self) -> &'static str {
        match self {
            TranslationModel::M2m100 => "@cf/meta/m2m100-1.2b",
        }
    }
}

/// Languages accepted by M2M100, limited to Discord's 25-choice cap.
/// `(display_name, wire value)`
pub const LANGUAGE_CHOICES: &[(&str, &str)] = &[
    ("English", "english"),
    ("Chinese", "chinese"),
    ("French", "french"),
    ("Spanish", "spanish"),
    ("Arabic", "arabic"),
    ("Russian", "russian"),
    ("German", "german"),
    ("Japanese", "japanese"),
    ("Portuguese", "portuguese"),
    ("Hindi", "hindi"),
    ("Italian", "italian"),
    ("Korean", "korean"),
    ("Dutch", "dutch"),
    ("Polish", "polish"),
    ("Turkish", "turkish"),
    ("Ukrainian", "ukrainian"),
    ("Swedish", "swedish"),
    ("Vietnamese", "vietnamese"),
    ("Indonesian", "indonesian"),
    ("Greek", "greek"),
    ("Czech", "czech"),
    ("Hebrew", "hebrew"),
    ("Thai", "thai"),
    ("Romanian", "romanian"),
    ("Hungarian", "hungarian"),
];

/// A translation language, stored as its wire value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language(&'static str);

impl Language {
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        LANGUAGE_CHOICES
            .iter()
            .find(|(_, value)| *value == lower)
            .map(|(_, value)| Language(*value))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}
