use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    GenerateRequest, HintAiError, LanguageModel, TokenBudget, DEFAULT_SAFETY_SETTINGS,
};

pub const DEFAULT_GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GOOGLE_MODEL: &str = "gemini-pro";

#[derive(Debug, Clone)]
/// Public struct `GoogleConfig` used across hint components.
pub struct GoogleConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone)]
/// Gemini-style client for model info, token counting and content generation.
pub struct GoogleClient {
    client: reqwest::Client,
    config: GoogleConfig,
}

impl GoogleClient {
    pub fn new(config: GoogleConfig) -> Result<Self, HintAiError> {
        if config.api_key.trim().is_empty() {
            return Err(HintAiError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(
                config.request_timeout_ms.max(1),
            ))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        self.config.model.trim_start_matches("models/")
    }

    fn model_url(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{base}/models/{}", self.model())
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}:{method}", self.model_url())
    }

    async fn send_json<T>(&self, request: reqwest::RequestBuilder) -> Result<T, HintAiError>
    where
        T: DeserializeOwned,
    {
        let response = request
            .query(&[("key", self.config.api_key.trim())])
            .send()
            .await?;
        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), raw));
        }
        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl LanguageModel for GoogleClient {
    async fn token_limits(&self) -> Result<TokenBudget, HintAiError> {
        let info: ModelInfoResponse = self.send_json(self.client.get(self.model_url())).await?;
        match (info.input_token_limit, info.output_token_limit) {
            (Some(input_tokens), Some(output_tokens)) => Ok(TokenBudget {
                input_tokens,
                output_tokens,
            }),
            _ => Err(HintAiError::InvalidResponse(format!(
                "model info for '{}' is missing token limits",
                self.model()
            ))),
        }
    }

    async fn count_tokens(&self, text: &str) -> Result<u64, HintAiError> {
        let body = build_count_tokens_body(text);
        let counted: CountTokensResponse = self
            .send_json(self.client.post(self.method_url("countTokens")).json(&body))
            .await?;
        counted.total_tokens.ok_or_else(|| {
            HintAiError::InvalidResponse("countTokens response missing totalTokens".to_string())
        })
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, HintAiError> {
        let body = build_generate_content_body(self.model(), &request);
        let response = self
            .client
            .post(self.method_url("generateContent"))
            .query(&[("key", self.config.api_key.trim())])
            .json(&body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let raw = response.text().await?;
        parse_generate_content_response(status, &raw)
    }
}

fn build_count_tokens_body(text: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": text }] }],
    })
}

fn build_generate_content_body(model: &str, request: &GenerateRequest) -> Value {
    let safety_settings = DEFAULT_SAFETY_SETTINGS
        .iter()
        .map(|setting| {
            json!({
                "category": setting.category.as_str(),
                "threshold": setting.threshold.as_str(),
            })
        })
        .collect::<Vec<_>>();

    json!({
        "model": format!("models/{model}"),
        "contents": [{ "parts": [{ "text": request.prompt }] }],
        "generationConfig": {
            "temperature": 0,
            "topK": 1,
            "topP": 1,
            "maxOutputTokens": request.max_output_tokens,
            "stopSequences": [],
        },
        "safetySettings": safety_settings,
    })
}

fn error_from_body(status: u16, raw: String) -> HintAiError {
    match serde_json::from_str::<ProviderErrorEnvelope>(&raw) {
        Ok(ProviderErrorEnvelope {
            error: Some(ProviderErrorBody {
                message: Some(message),
            }),
        }) if !message.trim().is_empty() => HintAiError::Provider { status, message },
        _ => HintAiError::HttpStatus { status, body: raw },
    }
}

fn parse_generate_content_response(status: u16, raw: &str) -> Result<String, HintAiError> {
    let parsed: GenerateContentResponse = match serde_json::from_str(raw) {
        Ok(parsed) => parsed,
        Err(_) if !(200..300).contains(&status) => {
            return Err(HintAiError::HttpStatus {
                status,
                body: raw.to_string(),
            })
        }
        Err(error) => return Err(HintAiError::Serde(error)),
    };

    let Some(candidate) = parsed
        .candidates
        .and_then(|mut candidates| candidates.drain(..).next())
    else {
        if let Some(message) = parsed.error.and_then(|error| error.message) {
            return Err(HintAiError::Provider { status, message });
        }
        if !(200..300).contains(&status) {
            return Err(HintAiError::HttpStatus {
                status,
                body: raw.to_string(),
            });
        }
        return Err(HintAiError::InvalidResponse(
            "response contained no candidates".to_string(),
        ));
    };

    candidate
        .content
        .and_then(|content| content.parts)
        .and_then(|parts| parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| {
            HintAiError::InvalidResponse(format!(
                "candidate contained no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ))
        })
}

#[derive(Debug, Deserialize)]
struct ModelInfoResponse {
    #[serde(rename = "inputTokenLimit")]
    input_token_limit: Option<u64>,
    #[serde(rename = "outputTokenLimit")]
    output_token_limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CountTokensResponse {
    #[serde(rename = "totalTokens")]
    total_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: Option<ProviderErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<GenerateContentCandidate>>,
    error: Option<ProviderErrorBody>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentCandidate {
    content: Option<GenerateContentContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentContent {
    parts: Option<Vec<GenerateContentPart>>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentPart {
    text: Option<String>,
}
