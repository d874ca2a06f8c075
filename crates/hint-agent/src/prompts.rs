//! Prompt text composition and the two-part rules document.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use hint_github::{GithubApiClient, GithubIssue, GithubLabel};

use crate::config::RulesSource;

pub const RULES_SEPARATOR: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Search-phase and answer-phase halves of the rules document.
pub struct Rules {
    pub search: String,
    pub answer: String,
}

impl Rules {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut sections = raw.split(RULES_SEPARATOR);
        let search = sections.next().unwrap_or_default();
        let answer = sections.next().ok_or_else(|| {
            anyhow!("rules document is missing the '{RULES_SEPARATOR}' section separator")
        })?;
        Ok(Self {
            search: search.to_string(),
            answer: answer.to_string(),
        })
    }
}

pub async fn load_rules(source: &RulesSource, github: &GithubApiClient) -> Result<Rules> {
    let raw = match source {
        RulesSource::File(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read rules file {}", path.display()))?,
        RulesSource::Url(url) => github
            .fetch_text(url)
            .await
            .context("failed to download rules document")?,
    };
    Rules::parse(&raw)
}

/// ISO-8601 timestamp with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
pub fn format_prompt_date(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn question_text(issue: &GithubIssue) -> String {
    format!(
        "{}\n{}",
        issue.title,
        issue.body.as_deref().unwrap_or_default()
    )
}

pub fn render_labels_block(labels: &[GithubLabel]) -> String {
    let mut block = String::from("Labels: {\n");
    for label in labels {
        block.push_str(&format!(
            "\"{}\" {}\n\n",
            label.name,
            label.description.as_deref().unwrap_or_default()
        ));
    }
    block.push('}');
    block
}

#[derive(Debug, Clone, Copy)]
pub struct PlannerPromptParts<'a> {
    pub labels: &'a [GithubLabel],
    pub search_rules: &'a str,
    pub date: &'a str,
    pub repo_description: &'a str,
    pub question: &'a str,
}

pub fn render_planner_prompt(parts: PlannerPromptParts<'_>) -> String {
    format!(
        "{}\n\n{}\nDate: {}\nRepo: {{{}}}\nQuestion: {{{}}}\nGithub search:\n",
        render_labels_block(parts.labels),
        parts.search_rules,
        parts.date,
        parts.repo_description,
        parts.question
    )
}

/// Fixed tail of the answer prompt; appended after the trimmed evidence.
pub fn render_answer_suffix(question: &str, date: &str, answer_rules: &str) -> String {
    format!("\n{{Prompt:\n{question}}}\n\nDate: {date}\n{answer_rules}\nAnswer:\n")
}

pub fn sign_answer(bot_name: &str, answer: &str) -> String {
    format!("{bot_name}:\n{answer}")
}
