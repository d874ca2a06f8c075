//! Relevance planning: asks the model whether to answer and what to search for.

use std::sync::OnceLock;

use hint_ai::{GenerateRequest, HintAiError, LanguageModel};
use regex::Regex;

use crate::prompts::{render_planner_prompt, PlannerPromptParts};

pub const PLANNER_MAX_OUTPUT_TOKENS: u64 = 100;
pub const REJECT_MARKER: &str = "#reject#";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Query fragments appended to `repo:<search repo>`; `None` skips that search.
pub struct SearchDirective {
    pub issues: Option<String>,
    pub commits: Option<String>,
}

impl SearchDirective {
    pub fn is_empty(&self) -> bool {
        self.issues.is_none() && self.commits.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannerDirective {
    Reject,
    Search(SearchDirective),
}

fn issues_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"Issues:(.+)").expect("issues directive pattern compiles"))
}

fn commits_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"Commits:(.+)").expect("commits directive pattern compiles"))
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|fragment| fragment.as_str().trim_end_matches('\r'))
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
}

pub fn parse_planner_response(response: &str) -> PlannerDirective {
    if response.contains(REJECT_MARKER) {
        return PlannerDirective::Reject;
    }
    PlannerDirective::Search(SearchDirective {
        issues: first_capture(issues_line_pattern(), response),
        commits: first_capture(commits_line_pattern(), response),
    })
}

pub async fn plan(
    model: &dyn LanguageModel,
    parts: PlannerPromptParts<'_>,
) -> Result<PlannerDirective, HintAiError> {
    let prompt = render_planner_prompt(parts);
    let response = model
        .generate(GenerateRequest::new(prompt, PLANNER_MAX_OUTPUT_TOKENS))
        .await?;
    Ok(parse_planner_response(&response))
}
