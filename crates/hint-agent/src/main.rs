use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use hint_agent::bootstrap_helpers::{init_tracing, render_failure_annotation};
use hint_agent::{run_hint, Cli, HintConfig, RunOutcome};
use hint_ai::GoogleClient;
use hint_github::GithubApiClient;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            println!("{}", render_failure_annotation(&error));
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = HintConfig::from_cli(&cli).context("invalid configuration")?;
    let github = GithubApiClient::new(
        &config.github_api_base,
        &config.github_token,
        config.request_timeout_ms,
    )?;
    let model = GoogleClient::new(config.google_config())?;

    match run_hint(&config, &github, &model, Utc::now()).await? {
        RunOutcome::Rejected => info!("question rejected, no comment posted"),
        RunOutcome::Published(outcome) => info!(?outcome, "answer published"),
    }
    Ok(())
}
