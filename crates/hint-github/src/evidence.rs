//! Normalized evidence records and their text-block rendering.
//!
//! Every record renders as a `{ ... }` block: header lines, a blank line,
//! then each comment as `author:\nbody\n\n`. Search hits and inline
//! references go through the same constructors so the same entity always
//! renders byte-identically.

use crate::github_types::{GithubComment, GithubCommit, GithubIssue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceState {
    Issue,
    ClosedIssue,
    PullRequest,
    ClosedPullRequest,
    MergedPullRequest,
    Commit,
}

impl EvidenceState {
    pub fn from_issue(issue: &GithubIssue) -> Self {
        let closed = issue.closed_at.is_some();
        match issue.pull_request.as_ref() {
            Some(pull_request) if pull_request.merged_at.is_some() => Self::MergedPullRequest,
            Some(_) if closed => Self::ClosedPullRequest,
            Some(_) => Self::PullRequest,
            None if closed => Self::ClosedIssue,
            None => Self::Issue,
        }
    }

    fn header_prefix(&self) -> &'static str {
        match self {
            Self::Issue => "Issue: ",
            Self::ClosedIssue => "Closed Issue: ",
            Self::PullRequest => "Pull Request: ",
            Self::ClosedPullRequest => "Closed Pull Request: ",
            Self::MergedPullRequest => "Merged Pull Request: ",
            Self::Commit => "Commit: ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceComment {
    pub author: String,
    pub body: String,
}

impl From<&GithubComment> for EvidenceComment {
    fn from(comment: &GithubComment) -> Self {
        Self {
            author: comment.user.login.clone(),
            body: comment.body.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One issue, pull request or commit plus its discussion thread.
pub struct EvidenceRecord {
    pub state: EvidenceState,
    pub author: String,
    /// Issue/PR number or commit SHA.
    pub identifier: String,
    /// Title for issues and pull requests, commit message for commits.
    pub title: String,
    pub body: String,
    pub comments: Vec<EvidenceComment>,
}

impl EvidenceRecord {
    pub fn from_issue(issue: &GithubIssue, comments: &[GithubComment]) -> Self {
        Self {
            state: EvidenceState::from_issue(issue),
            author: issue.user.login.clone(),
            identifier: issue.number.to_string(),
            title: issue.title.clone(),
            body: issue.body.clone().unwrap_or_default(),
            comments: comments.iter().map(EvidenceComment::from).collect(),
        }
    }

    pub fn from_commit(commit: &GithubCommit, comments: &[GithubComment]) -> Self {
        Self {
            state: EvidenceState::Commit,
            author: commit.commit.author.name.clone(),
            identifier: commit.sha.clone(),
            title: commit.commit.message.clone(),
            body: String::new(),
            comments: comments.iter().map(EvidenceComment::from).collect(),
        }
    }

    pub fn render(&self) -> String {
        let mut block = String::from("{");
        block.push_str(self.state.header_prefix());
        match self.state {
            EvidenceState::Commit => {
                block.push_str(&format!(
                    "{}\nSha: {}\n{}\n\n",
                    self.author, self.identifier, self.title
                ));
            }
            _ => {
                block.push_str(&format!(
                    "{}\nNumber: {}\n{}:\n{}\n\n",
                    self.title, self.identifier, self.author, self.body
                ));
            }
        }
        for comment in &self.comments {
            block.push_str(&format!("{}:\n{}\n\n", comment.author, comment.body));
        }
        block.push('}');
        block
    }
}
