use anyhow::{Context, Result};
use hint_github::{GithubApiClient, GithubComment, RepoRef};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Created { comment_id: u64 },
    Updated { comment_id: u64 },
}

impl PublishOutcome {
    pub fn comment_id(self) -> u64 {
        match self {
            Self::Created { comment_id } | Self::Updated { comment_id } => comment_id,
        }
    }
}

/// A comment counts as the agent's own when a bot account wrote it and its
/// body starts with the configured bot name.
pub fn is_own_comment(comment: &GithubComment, bot_name: &str) -> bool {
    comment.user.is_bot()
        && comment
            .body
            .as_deref()
            .is_some_and(|body| body.starts_with(bot_name))
}

/// Edits the agent's earlier answer in place when it is the first comment on
/// the issue; otherwise posts a new comment.
pub async fn publish_answer(
    github: &GithubApiClient,
    repo: &RepoRef,
    issue_number: u64,
    bot_name: &str,
    body: &str,
) -> Result<PublishOutcome> {
    let comments = github
        .issue_comments(repo, issue_number)
        .await
        .context("failed to list existing issue comments")?;

    if let Some(first) = comments.first().filter(|first| is_own_comment(first, bot_name)) {
        let updated = github
            .update_issue_comment(repo, first.id, body)
            .await
            .context("failed to update previous answer")?;
        info!(comment_id = updated.id, "updated previous answer");
        return Ok(PublishOutcome::Updated {
            comment_id: updated.id,
        });
    }

    let created = github
        .create_issue_comment(repo, issue_number, body)
        .await
        .context("failed to post answer")?;
    info!(comment_id = created.id, "posted answer");
    Ok(PublishOutcome::Created {
        comment_id: created.id,
    })
}
