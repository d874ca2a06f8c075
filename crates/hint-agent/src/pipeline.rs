//! End-to-end run: question, plan, evidence, budget, answer, publish.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use hint_ai::{GenerateRequest, LanguageModel};
use hint_github::{extract_references, EvidenceFetcher, GithubApiClient};
use tracing::info;

use crate::budget::{evidence_token_budget, trim_to_token_limit};
use crate::config::HintConfig;
use crate::evidence_set::EvidenceSet;
use crate::planner::{plan, PlannerDirective};
use crate::prompts::{
    format_prompt_date, load_rules, question_text, render_answer_suffix, sign_answer,
    PlannerPromptParts,
};
use crate::publisher::{publish_answer, PublishOutcome};
use crate::search::run_searches;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The planner declined the question; nothing was posted.
    Rejected,
    Published(PublishOutcome),
}

pub async fn run_hint(
    config: &HintConfig,
    github: &GithubApiClient,
    model: &dyn LanguageModel,
    now: DateTime<Utc>,
) -> Result<RunOutcome> {
    let date = format_prompt_date(now);

    let (labels, repository, issue, rules, budget) = tokio::try_join!(
        async {
            github
                .labels(&config.search_repo)
                .await
                .context("failed to list repository labels")
        },
        async {
            github
                .repository(&config.search_repo)
                .await
                .context("failed to read repository metadata")
        },
        async {
            github
                .issue(&config.repo, config.issue_number)
                .await
                .context("failed to read question issue")
        },
        async { load_rules(&config.rules, github).await },
        async {
            model
                .token_limits()
                .await
                .context("failed to read model token limits")
        },
    )?;
    info!(
        "Question: {}#{} ({} input / {} output tokens)",
        config.repo, config.issue_number, budget.input_tokens, budget.output_tokens
    );

    let question = question_text(&issue);
    let mut evidence = EvidenceSet::new();
    let referenced =
        evidence.schedule_references(extract_references(&question, &config.search_repo));

    let directive = plan(
        model,
        PlannerPromptParts {
            labels: &labels,
            search_rules: &rules.search,
            date: &date,
            repo_description: repository.description.as_deref().unwrap_or_default(),
            question: &question,
        },
    )
    .await
    .context("relevance planning failed")?;
    let search = match directive {
        PlannerDirective::Reject => {
            info!("rejected");
            return Ok(RunOutcome::Rejected);
        }
        PlannerDirective::Search(search) => search,
    };
    if let Some(commits) = &search.commits {
        info!("Commits:{commits}");
    }
    if let Some(issues) = &search.issues {
        info!("Issues:{issues}");
    }

    let hits = run_searches(github, &config.search_repo, &search, budget).await?;
    let searched = hits.merge_into(&mut evidence);
    info!(referenced, searched, "scheduled evidence fetches");

    let resolved = evidence
        .resolve(EvidenceFetcher::new(github))
        .await
        .context("evidence fetch failed")?;
    let suffix = render_answer_suffix(&question, &date, &rules.answer);
    let suffix_tokens = model
        .count_tokens(&suffix)
        .await
        .context("failed to measure answer prompt suffix")?;
    let data = trim_to_token_limit(
        model,
        resolved.concatenated(),
        evidence_token_budget(budget.input_tokens, suffix_tokens),
    )
    .await
    .context("failed to fit evidence into the token budget")?;
    info!(
        "Data: {} chars from {} records",
        data.chars().count(),
        resolved.present_count()
    );

    let answer = model
        .generate(GenerateRequest::new(
            format!("{data}{suffix}"),
            budget.output_tokens,
        ))
        .await
        .context("answer generation failed")?;
    let body = sign_answer(&config.bot_name, &answer);
    let published = publish_answer(
        github,
        &config.repo,
        config.issue_number,
        &config.bot_name,
        &body,
    )
    .await?;
    info!("comment id {}", published.comment_id());
    Ok(RunOutcome::Published(published))
}
