//! Issue tracker plumbing for the hint agent.
//! This crate provides the GitHub REST client, the wire types it decodes,
//! evidence record formatting, and inline reference extraction.

pub mod evidence;
pub mod evidence_fetcher;
pub mod github_api_client;
pub mod github_transport_helpers;
pub mod github_types;
pub mod references;

pub use evidence::{EvidenceComment, EvidenceRecord, EvidenceState};
pub use evidence_fetcher::EvidenceFetcher;
pub use github_api_client::{GithubApiClient, GithubCommentWriteResponse};
pub use github_types::{
    GithubComment, GithubCommit, GithubCommitAuthor, GithubCommitDetail, GithubIssue,
    GithubLabel, GithubPullRequestRef, GithubRepository, GithubSearchResults, GithubUser,
    RepoRef,
};
pub use references::{extract_references, Reference, ReferenceTarget};
