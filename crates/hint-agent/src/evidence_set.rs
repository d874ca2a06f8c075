//! Deduplicated, insertion-ordered collection of evidence fetches.
//!
//! Keys are scheduled synchronously (references first, then search hits) and
//! each key's fetch is started exactly once when the whole set is resolved as
//! a single concurrent batch. Concatenation follows scheduling order.

use std::collections::HashSet;

use anyhow::Result;
use futures_util::future::try_join_all;
use hint_github::{
    EvidenceFetcher, EvidenceRecord, GithubCommit, GithubIssue, Reference, ReferenceTarget,
};

#[derive(Debug, Clone, PartialEq)]
pub enum EvidenceJob {
    /// Inline reference; existence-tolerant primary fetch.
    Reference(ReferenceTarget),
    /// Commit search hit; only its comment thread is fetched.
    CommitHit(GithubCommit),
    /// Issue search hit; only its comment thread is fetched.
    IssueHit(GithubIssue),
}

#[derive(Debug, Default)]
pub struct EvidenceSet {
    seen: HashSet<String>,
    pending: Vec<(String, EvidenceJob)>,
}

impl EvidenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` and drops `job` when `key` is already scheduled.
    pub fn schedule(&mut self, key: impl Into<String>, job: EvidenceJob) -> bool {
        let key = key.into();
        if !self.seen.insert(key.clone()) {
            return false;
        }
        self.pending.push((key, job));
        true
    }

    pub fn schedule_references(&mut self, references: Vec<Reference>) -> usize {
        let mut scheduled = 0;
        for reference in references {
            if self.schedule(reference.key, EvidenceJob::Reference(reference.target)) {
                scheduled += 1;
            }
        }
        scheduled
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(|(key, _)| key.as_str())
    }

    pub async fn resolve(self, fetcher: EvidenceFetcher<'_>) -> Result<ResolvedEvidence> {
        let entries = try_join_all(self.pending.into_iter().map(|(key, job)| async move {
            let record = match job {
                EvidenceJob::Reference(ReferenceTarget::Issue { repo, number }) => {
                    fetcher.fetch_issue_or_pr(&repo, number).await?
                }
                EvidenceJob::Reference(ReferenceTarget::Commit { repo, sha }) => {
                    fetcher.fetch_commit(&repo, &sha).await?
                }
                EvidenceJob::CommitHit(commit) => Some(fetcher.commit_record(&commit).await),
                EvidenceJob::IssueHit(issue) => Some(fetcher.issue_record(&issue).await),
            };
            anyhow::Ok((key, record))
        }))
        .await?;
        Ok(ResolvedEvidence { entries })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedEvidence {
    entries: Vec<(String, Option<EvidenceRecord>)>,
}

impl ResolvedEvidence {
    pub fn entries(&self) -> &[(String, Option<EvidenceRecord>)] {
        &self.entries
    }

    pub fn present_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, record)| record.is_some())
            .count()
    }

    /// Rendered blocks in scheduling order; absent entries contribute `""`.
    pub fn concatenated(&self) -> String {
        self.entries
            .iter()
            .map(|(_, record)| record.as_ref().map(EvidenceRecord::render).unwrap_or_default())
            .collect()
    }
}
