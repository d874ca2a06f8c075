use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Input and output token ceilings reported by the provider for one model.
pub struct TokenBudget {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates the content-safety categories the agent filters on.
pub enum HarmCategory {
    Harassment,
    HateSpeech,
    SexuallyExplicit,
    DangerousContent,
}

impl HarmCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Harassment => "HARM_CATEGORY_HARASSMENT",
            Self::HateSpeech => "HARM_CATEGORY_HATE_SPEECH",
            Self::SexuallyExplicit => "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            Self::DangerousContent => "HARM_CATEGORY_DANGEROUS_CONTENT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarmBlockThreshold {
    BlockLowAndAbove,
    BlockMediumAndAbove,
    BlockOnlyHigh,
}

impl HarmBlockThreshold {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlockLowAndAbove => "BLOCK_LOW_AND_ABOVE",
            Self::BlockMediumAndAbove => "BLOCK_MEDIUM_AND_ABOVE",
            Self::BlockOnlyHigh => "BLOCK_ONLY_HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

/// Safety policy attached to every generation request.
pub const DEFAULT_SAFETY_SETTINGS: [SafetySetting; 4] = [
    SafetySetting {
        category: HarmCategory::Harassment,
        threshold: HarmBlockThreshold::BlockMediumAndAbove,
    },
    SafetySetting {
        category: HarmCategory::HateSpeech,
        threshold: HarmBlockThreshold::BlockMediumAndAbove,
    },
    SafetySetting {
        category: HarmCategory::SexuallyExplicit,
        threshold: HarmBlockThreshold::BlockMediumAndAbove,
    },
    SafetySetting {
        category: HarmCategory::DangerousContent,
        threshold: HarmBlockThreshold::BlockMediumAndAbove,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single-prompt generation request. Decoding is always deterministic.
pub struct GenerateRequest {
    pub prompt: String,
    pub max_output_tokens: u64,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>, max_output_tokens: u64) -> Self {
        Self {
            prompt: prompt.into(),
            max_output_tokens,
        }
    }
}

#[derive(Debug, Error)]
/// Enumerates supported `HintAiError` values.
pub enum HintAiError {
    #[error("missing API key")]
    MissingApiKey,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("provider error (status {status}): {message}")]
    Provider { status: u16, message: String },
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
/// Trait contract for the language model provider consumed by the pipeline.
pub trait LanguageModel: Send + Sync {
    /// Fetches the model's input/output token ceilings.
    async fn token_limits(&self) -> Result<TokenBudget, HintAiError>;

    /// Measures `text` with the provider's tokenizer. Never cached.
    async fn count_tokens(&self, text: &str) -> Result<u64, HintAiError>;

    async fn generate(&self, request: GenerateRequest) -> Result<String, HintAiError>;
}
