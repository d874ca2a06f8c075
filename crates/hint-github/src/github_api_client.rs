use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::github_transport_helpers::{is_absent_status, truncate_for_error};
use crate::github_types::{
    GithubComment, GithubCommit, GithubIssue, GithubLabel, GithubRepository,
    GithubSearchResults, RepoRef,
};

pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";

#[derive(Debug, Clone, Deserialize)]
pub struct GithubCommentWriteResponse {
    pub id: u64,
    pub html_url: Option<String>,
}

#[derive(Clone)]
/// Bearer-authenticated GitHub REST client. Requests are never retried.
pub struct GithubApiClient {
    http: reqwest::Client,
    api_base: String,
}

impl GithubApiClient {
    pub fn new(api_base: &str, token: &str, request_timeout_ms: u64) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("ai-hint"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let auth_header = format!("Bearer {}", token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .context("invalid github authorization header")?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create github api client")?;
        Ok(Self {
            http: client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub async fn repository(&self, repo: &RepoRef) -> Result<GithubRepository> {
        self.request_json(
            "get repository",
            self.http.get(format!("{}/repos/{repo}", self.api_base)),
        )
        .await
    }

    pub async fn labels(&self, repo: &RepoRef) -> Result<Vec<GithubLabel>> {
        self.request_json(
            "list labels",
            self.http.get(format!("{}/repos/{repo}/labels", self.api_base)),
        )
        .await
    }

    pub async fn issue(&self, repo: &RepoRef, number: u64) -> Result<GithubIssue> {
        self.request_json(
            "get issue",
            self.http
                .get(format!("{}/repos/{repo}/issues/{number}", self.api_base)),
        )
        .await
    }

    /// Existence-tolerant issue/PR lookup used for inline references.
    pub async fn find_issue(&self, repo: &RepoRef, number: u64) -> Result<Option<GithubIssue>> {
        self.request_optional_json(
            "get referenced issue",
            self.http
                .get(format!("{}/repos/{repo}/issues/{number}", self.api_base)),
        )
        .await
    }

    /// Existence-tolerant commit lookup used for inline SHA tokens.
    pub async fn find_commit(&self, repo: &RepoRef, sha: &str) -> Result<Option<GithubCommit>> {
        self.request_optional_json(
            "get referenced commit",
            self.http
                .get(format!("{}/repos/{repo}/commits/{sha}", self.api_base)),
        )
        .await
    }

    /// Reads a comment thread by its `comments_url`. Any failure yields no comments.
    pub async fn thread_comments(&self, comments_url: &str) -> Vec<GithubComment> {
        let response = match self.http.get(comments_url).send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(url = comments_url, %error, "comment thread request failed");
                return Vec::new();
            }
        };
        let status = response.status();
        if !status.is_success() {
            warn!(
                url = comments_url,
                status = status.as_u16(),
                "comment thread request returned non-success status"
            );
            return Vec::new();
        }
        match response.json::<Vec<GithubComment>>().await {
            Ok(comments) => comments,
            Err(error) => {
                warn!(url = comments_url, %error, "comment thread response was malformed");
                Vec::new()
            }
        }
    }

    /// Lists the first page of comments on an issue, oldest first.
    pub async fn issue_comments(&self, repo: &RepoRef, number: u64) -> Result<Vec<GithubComment>> {
        self.request_json(
            "list issue comments",
            self.http.get(format!(
                "{}/repos/{repo}/issues/{number}/comments",
                self.api_base
            )),
        )
        .await
    }

    pub async fn search_commits(&self, query: &str, per_page: u64) -> Result<Vec<GithubCommit>> {
        let per_page = per_page.to_string();
        let results: GithubSearchResults<GithubCommit> = self
            .request_json(
                "search commits",
                self.http
                    .get(format!("{}/search/commits", self.api_base))
                    .query(&[("per_page", per_page.as_str()), ("q", query)]),
            )
            .await?;
        Ok(results.items)
    }

    pub async fn search_issues(&self, query: &str, per_page: u64) -> Result<Vec<GithubIssue>> {
        let per_page = per_page.to_string();
        let results: GithubSearchResults<GithubIssue> = self
            .request_json(
                "search issues",
                self.http
                    .get(format!("{}/search/issues", self.api_base))
                    .query(&[("per_page", per_page.as_str()), ("q", query)]),
            )
            .await?;
        Ok(results.items)
    }

    pub async fn create_issue_comment(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        body: &str,
    ) -> Result<GithubCommentWriteResponse> {
        let payload = json!({ "body": body });
        self.request_json(
            "create issue comment",
            self.http
                .post(format!(
                    "{}/repos/{repo}/issues/{issue_number}/comments",
                    self.api_base
                ))
                .json(&payload),
        )
        .await
    }

    pub async fn update_issue_comment(
        &self,
        repo: &RepoRef,
        comment_id: u64,
        body: &str,
    ) -> Result<GithubCommentWriteResponse> {
        let payload = json!({ "body": body });
        self.request_json(
            "update issue comment",
            self.http
                .patch(format!(
                    "{}/repos/{repo}/issues/comments/{comment_id}",
                    self.api_base
                ))
                .json(&payload),
        )
        .await
    }

    /// Downloads a plain-text document (e.g. the rules file) with the same credential.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("request for '{url}' failed"))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read body of '{url}'"))?;
        if !status.is_success() {
            bail!(
                "download of '{url}' failed with status {}: {}",
                status.as_u16(),
                truncate_for_error(&body, 800)
            );
        }
        Ok(body)
    }

    async fn request_json<T>(&self, operation: &str, request: reqwest::RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .with_context(|| format!("github api {operation} request failed"))?;
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .with_context(|| format!("failed to decode github {operation}"));
        }

        let body = response.text().await.unwrap_or_default();
        bail!(
            "github api {operation} failed with status {}: {}",
            status.as_u16(),
            truncate_for_error(&body, 800)
        );
    }

    async fn request_optional_json<T>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .with_context(|| format!("github api {operation} request failed"))?;
        let status = response.status();
        if is_absent_status(status.as_u16()) {
            debug!(
                operation,
                status = status.as_u16(),
                "resource absent, contributing no evidence"
            );
            return Ok(None);
        }
        match response.json::<T>().await {
            Ok(parsed) => Ok(Some(parsed)),
            Err(error) => {
                debug!(operation, %error, "resource body unrecognised, treating as absent");
                Ok(None)
            }
        }
    }
}
