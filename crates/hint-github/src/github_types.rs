use std::fmt;

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// An `owner/name` repository slug.
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (owner, name) = trimmed
            .split_once('/')
            .ok_or_else(|| anyhow!("invalid repository '{raw}', expected owner/repo"))?;
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            bail!("invalid repository '{raw}', expected owner/repo");
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn as_slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GithubUser {
    pub login: String,
    /// Account kind as reported by GitHub (`User`, `Bot`, `Organization`).
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
}

impl GithubUser {
    pub fn is_bot(&self) -> bool {
        self.account_type.as_deref() == Some("Bot")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GithubLabel {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GithubRepository {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GithubPullRequestRef {
    #[serde(default)]
    pub merged_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
/// Issue or pull request as returned by the issues and issue-search endpoints.
pub struct GithubIssue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub user: GithubUser,
    #[serde(default)]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub pull_request: Option<GithubPullRequestRef>,
    #[serde(default)]
    pub comments: u64,
    pub comments_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GithubComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    pub user: GithubUser,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GithubCommitAuthor {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GithubCommitDetail {
    pub author: GithubCommitAuthor,
    pub message: String,
    #[serde(default)]
    pub comment_count: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
/// Commit as returned by the commits and commit-search endpoints.
pub struct GithubCommit {
    pub sha: String,
    pub commit: GithubCommitDetail,
    pub comments_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GithubSearchResults<T> {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}
