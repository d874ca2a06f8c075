//! Context budgeting: shrinks the evidence block until it fits the model.
//!
//! The trim loop assumes token length grows roughly linearly with character
//! length. Each pass keeps `floor(chars * limit / tokens) - 1` characters and
//! re-measures with the provider. Every pass removes at least one character
//! while the text is over budget, so the loop ends once the provider's count
//! is non-decreasing in prefix length; that monotonicity is an assumption
//! about the tokenizer, not something the loop can check.

use hint_ai::{HintAiError, LanguageModel};
use tracing::{debug, warn};

/// Tokens left for evidence once the fixed prompt suffix is accounted for.
pub fn evidence_token_budget(input_ceiling: u64, suffix_tokens: u64) -> u64 {
    input_ceiling.saturating_sub(suffix_tokens)
}

/// Character count kept by one proportional-truncation pass.
pub fn proportional_length(char_len: usize, limit: u64, measured_tokens: u64) -> usize {
    let scaled = (char_len as u128 * u128::from(limit)) / u128::from(measured_tokens.max(1));
    usize::try_from(scaled)
        .unwrap_or(char_len)
        .min(char_len)
        .saturating_sub(1)
}

fn truncate_chars(text: &mut String, keep: usize) {
    if let Some((byte_index, _)) = text.char_indices().nth(keep) {
        text.truncate(byte_index);
    }
}

/// Returns the longest proportional prefix of `text` whose measured token
/// length is at most `limit`.
pub async fn trim_to_token_limit(
    model: &dyn LanguageModel,
    text: String,
    limit: u64,
) -> Result<String, HintAiError> {
    let mut text = text;
    if text.is_empty() {
        return Ok(text);
    }

    let mut tokens = model.count_tokens(&text).await?;
    let mut iterations = 0_usize;
    while tokens > limit {
        let char_len = text.chars().count();
        if char_len == 0 {
            warn!(tokens, limit, "empty evidence still exceeds token limit");
            break;
        }
        truncate_chars(&mut text, proportional_length(char_len, limit, tokens));
        tokens = model.count_tokens(&text).await?;
        iterations += 1;
    }

    debug!(iterations, tokens, limit, "evidence trim finished");
    Ok(text)
}
