//! Validated runtime configuration.
//!
//! `HintConfig` is built once from [`Cli`] before any network call and is
//! then passed by reference to every component.

use std::path::PathBuf;

use hint_ai::GoogleConfig;
use hint_github::RepoRef;
use thiserror::Error;

use crate::cli_args::Cli;

/// Length of a well-formed provider API key.
pub const AI_KEY_LENGTH: usize = 39;
const DEFAULT_RULES_FILE_NAME: &str = "Rules.txt";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("invalid AI API key: expected 39 characters, got {0}")]
    InvalidAiKey(usize),
    #[error("invalid repository '{0}', expected owner/repo")]
    InvalidRepository(String),
    #[error("issue number must be greater than 0")]
    InvalidIssueNumber,
    #[error(
        "no rules location: set --rules-file, --rules-path with --ref-name, or --action-repository with --action-ref"
    )]
    MissingRulesLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesSource {
    File(PathBuf),
    Url(String),
}

#[derive(Debug, Clone)]
pub struct HintConfig {
    pub github_api_base: String,
    pub github_token: String,
    pub repo: RepoRef,
    pub issue_number: u64,
    pub search_repo: RepoRef,
    pub bot_name: String,
    pub ai_api_base: String,
    pub ai_token: String,
    pub ai_model: String,
    pub rules: RulesSource,
    pub request_timeout_ms: u64,
}

impl HintConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let ai_token = required(cli.ai_token.as_deref(), "AI API key (--ai-token / AI_TOKEN)")?;
        let ai_key_length = ai_token.chars().count();
        if ai_key_length != AI_KEY_LENGTH {
            return Err(ConfigError::InvalidAiKey(ai_key_length));
        }
        let github_token = required(
            cli.github_token.as_deref(),
            "GitHub token (--github-token / GITHUB_TOKEN)",
        )?;
        let repo = parse_repo(required(
            cli.repository.as_deref(),
            "repository (--repository / GITHUB_REPOSITORY)",
        )?)?;
        let issue_number = cli
            .issue_number
            .ok_or(ConfigError::Missing("issue number (--issue-number / ISSUE_NUMBER)"))?;
        if issue_number == 0 {
            return Err(ConfigError::InvalidIssueNumber);
        }
        let search_repo = match cli.search_repo.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_repo(raw)?,
            _ => repo.clone(),
        };
        let rules = resolve_rules_source(cli, &repo)?;

        Ok(Self {
            github_api_base: cli.github_api_url.trim_end_matches('/').to_string(),
            github_token: github_token.to_string(),
            repo,
            issue_number,
            search_repo,
            bot_name: cli.bot_name.clone(),
            ai_api_base: cli.ai_api_base.clone(),
            ai_token: ai_token.to_string(),
            ai_model: cli.ai_model.clone(),
            rules,
            request_timeout_ms: cli.request_timeout_ms,
        })
    }

    pub fn google_config(&self) -> GoogleConfig {
        GoogleConfig {
            api_base: self.ai_api_base.clone(),
            api_key: self.ai_token.clone(),
            model: self.ai_model.clone(),
            request_timeout_ms: self.request_timeout_ms,
        }
    }
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, ConfigError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_repo(raw: &str) -> Result<RepoRef, ConfigError> {
    RepoRef::parse(raw).map_err(|_| ConfigError::InvalidRepository(raw.to_string()))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn resolve_rules_source(cli: &Cli, repo: &RepoRef) -> Result<RulesSource, ConfigError> {
    if let Some(path) = cli.rules_file.as_ref() {
        return Ok(RulesSource::File(path.clone()));
    }
    let raw_base = cli.raw_content_base.trim_end_matches('/');
    if let Some(rules_path) = non_blank(cli.rules_path.as_deref()) {
        let ref_name = non_blank(cli.ref_name.as_deref())
            .ok_or(ConfigError::Missing("ref name (--ref-name / GITHUB_REF_NAME)"))?;
        return Ok(RulesSource::Url(format!(
            "{raw_base}/{repo}/{ref_name}/{}",
            rules_path.trim_start_matches('/')
        )));
    }
    match (
        non_blank(cli.action_repository.as_deref()),
        non_blank(cli.action_ref.as_deref()),
    ) {
        (Some(action_repository), Some(action_ref)) => Ok(RulesSource::Url(format!(
            "{raw_base}/{action_repository}/{action_ref}/{DEFAULT_RULES_FILE_NAME}"
        ))),
        _ => Err(ConfigError::MissingRulesLocation),
    }
}
