use anyhow::{Context, Result};
use hint_ai::TokenBudget;
use hint_github::{GithubApiClient, GithubCommit, GithubIssue, RepoRef};
use tracing::info;

use crate::evidence_set::{EvidenceJob, EvidenceSet};
use crate::planner::SearchDirective;

/// Approximate token cost of one rendered commit record.
pub const AVG_TOKENS_PER_COMMIT_RECORD: u64 = 450;
/// Approximate token cost of one rendered issue or pull request record.
pub const AVG_TOKENS_PER_ISSUE_RECORD: u64 = 900;

pub fn search_page_size(input_ceiling: u64, avg_tokens_per_record: u64) -> u64 {
    input_ceiling / avg_tokens_per_record.max(1)
}

pub fn search_query(repo: &RepoRef, fragment: &str) -> String {
    format!("repo:{repo}{fragment}")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    pub commits: Vec<GithubCommit>,
    pub issues: Vec<GithubIssue>,
}

impl SearchHits {
    /// Schedules every hit not already in `set`; commits first, keyed by SHA,
    /// then issues, keyed by tracker id.
    pub fn merge_into(self, set: &mut EvidenceSet) -> usize {
        let mut added = 0;
        for commit in self.commits {
            if set.schedule(commit.sha.clone(), EvidenceJob::CommitHit(commit)) {
                added += 1;
            }
        }
        for issue in self.issues {
            if set.schedule(issue.id.to_string(), EvidenceJob::IssueHit(issue)) {
                added += 1;
            }
        }
        added
    }
}

/// Runs the commit and issue searches the directive asks for, concurrently.
pub async fn run_searches(
    github: &GithubApiClient,
    repo: &RepoRef,
    directive: &SearchDirective,
    budget: TokenBudget,
) -> Result<SearchHits> {
    let commits = async {
        match directive.commits.as_deref() {
            Some(fragment) => {
                let per_page = search_page_size(budget.input_tokens, AVG_TOKENS_PER_COMMIT_RECORD);
                github
                    .search_commits(&search_query(repo, fragment), per_page)
                    .await
                    .context("commit search failed")
            }
            None => Ok(Vec::new()),
        }
    };
    let issues = async {
        match directive.issues.as_deref() {
            Some(fragment) => {
                let per_page = search_page_size(budget.input_tokens, AVG_TOKENS_PER_ISSUE_RECORD);
                github
                    .search_issues(&search_query(repo, fragment), per_page)
                    .await
                    .context("issue search failed")
            }
            None => Ok(Vec::new()),
        }
    };
    let (commits, issues) = tokio::try_join!(commits, issues)?;
    info!(
        commit_hits = commits.len(),
        issue_hits = issues.len(),
        "search finished"
    );
    Ok(SearchHits { commits, issues })
}
