//! Generative-language provider client used by the hint agent.
//!
//! Exposes the provider through the [`LanguageModel`] trait so callers can
//! measure token ceilings, count tokens, and request completions without
//! depending on the wire format.
mod google;
mod types;

pub use google::{GoogleClient, GoogleConfig, DEFAULT_GOOGLE_API_BASE, DEFAULT_GOOGLE_MODEL};
pub use types::{
    GenerateRequest, HarmBlockThreshold, HarmCategory, HintAiError, LanguageModel, SafetySetting,
    TokenBudget, DEFAULT_SAFETY_SETTINGS,
};
