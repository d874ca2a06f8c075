use std::path::PathBuf;

use clap::Parser;

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "ai-hint",
    about = "Answers an issue-tracker question with repository context and a generative model",
    version
)]
/// Command-line and environment surface of the agent. Parsed once in `main`.
pub struct Cli {
    #[arg(
        long = "github-api-url",
        env = "GITHUB_API_URL",
        default_value = "https://api.github.com",
        help = "Base URL of the GitHub REST API"
    )]
    pub github_api_url: String,

    #[arg(
        long = "github-token",
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        help = "Bearer token used for every GitHub request"
    )]
    pub github_token: Option<String>,

    #[arg(
        long,
        env = "GITHUB_REPOSITORY",
        help = "Repository (owner/repo) hosting the question issue"
    )]
    pub repository: Option<String>,

    #[arg(
        long = "issue-number",
        env = "ISSUE_NUMBER",
        help = "Number of the issue holding the question"
    )]
    pub issue_number: Option<u64>,

    #[arg(
        long = "search-repo",
        env = "SEARCH_REPO",
        help = "Repository (owner/repo) searched for evidence; defaults to --repository"
    )]
    pub search_repo: Option<String>,

    #[arg(
        long = "bot-name",
        env = "BOT_NAME",
        default_value = "AI Hint",
        help = "Signature line prepended to answers and used to recognise earlier answers"
    )]
    pub bot_name: String,

    #[arg(
        long = "ai-token",
        env = "AI_TOKEN",
        hide_env_values = true,
        help = "API key for the generative-language provider"
    )]
    pub ai_token: Option<String>,

    #[arg(
        long = "ai-api-base",
        env = "AI_API_BASE",
        default_value = hint_ai::DEFAULT_GOOGLE_API_BASE,
        help = "Base URL of the generative-language API"
    )]
    pub ai_api_base: String,

    #[arg(
        long = "ai-model",
        env = "AI_MODEL",
        default_value = hint_ai::DEFAULT_GOOGLE_MODEL,
        help = "Model used for planning, token counting and answering"
    )]
    pub ai_model: String,

    #[arg(
        long = "rules-file",
        env = "RULES_FILE",
        help = "Local rules document; takes precedence over remote rules locations"
    )]
    pub rules_file: Option<PathBuf>,

    #[arg(
        long = "rules-path",
        env = "RULES_PATH",
        help = "Rules document path inside --repository at --ref-name"
    )]
    pub rules_path: Option<String>,

    #[arg(
        long = "ref-name",
        env = "GITHUB_REF_NAME",
        help = "Git ref of --repository used with --rules-path"
    )]
    pub ref_name: Option<String>,

    #[arg(
        long = "action-repository",
        env = "GITHUB_ACTION_REPOSITORY",
        help = "Repository of the running action; its Rules.txt is the default rules document"
    )]
    pub action_repository: Option<String>,

    #[arg(
        long = "action-ref",
        env = "GITHUB_ACTION_REF",
        help = "Git ref of --action-repository"
    )]
    pub action_ref: Option<String>,

    #[arg(
        long = "raw-content-base",
        env = "RAW_CONTENT_BASE",
        default_value = "https://raw.githubusercontent.com",
        help = "Base URL serving raw repository files"
    )]
    pub raw_content_base: String,

    #[arg(
        long = "request-timeout-ms",
        env = "HINT_REQUEST_TIMEOUT_MS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_MS,
        value_parser = parse_positive_u64,
        help = "Transport timeout applied to every HTTP request"
    )]
    pub request_timeout_ms: u64,
}
