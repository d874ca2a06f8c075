use anyhow::Result;

use crate::evidence::EvidenceRecord;
use crate::github_api_client::GithubApiClient;
use crate::github_types::{GithubCommit, GithubIssue, RepoRef};

#[derive(Clone, Copy)]
/// Builds evidence records from tracker resources, pulling their comment threads.
///
/// Primary resource lookups are existence-tolerant (`Ok(None)` when absent)
/// and fail only on transport errors; comment sub-fetches never fail.
pub struct EvidenceFetcher<'a> {
    client: &'a GithubApiClient,
}

impl<'a> EvidenceFetcher<'a> {
    pub fn new(client: &'a GithubApiClient) -> Self {
        Self { client }
    }

    pub async fn fetch_issue_or_pr(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<Option<EvidenceRecord>> {
        match self.client.find_issue(repo, number).await? {
            Some(issue) => Ok(Some(self.issue_record(&issue).await)),
            None => Ok(None),
        }
    }

    pub async fn fetch_commit(&self, repo: &RepoRef, sha: &str) -> Result<Option<EvidenceRecord>> {
        match self.client.find_commit(repo, sha).await? {
            Some(commit) => Ok(Some(self.commit_record(&commit).await)),
            None => Ok(None),
        }
    }

    pub async fn issue_record(&self, issue: &GithubIssue) -> EvidenceRecord {
        let comments = if issue.comments > 0 {
            self.client.thread_comments(&issue.comments_url).await
        } else {
            Vec::new()
        };
        EvidenceRecord::from_issue(issue, &comments)
    }

    pub async fn commit_record(&self, commit: &GithubCommit) -> EvidenceRecord {
        let comments = if commit.commit.comment_count > 0 {
            self.client.thread_comments(&commit.comments_url).await
        } else {
            Vec::new()
        };
        EvidenceRecord::from_commit(commit, &comments)
    }
}
