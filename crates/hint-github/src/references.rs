//! Inline cross-reference scanning.
//!
//! Two independent passes over the whole text: `[owner/repo]#<digits>` issue
//! references, then hexadecimal tokens of six or more characters treated as
//! commit SHAs. Identity keys are the captured digits and the raw hex token.
//! The owner/repo prefix is not part of the key, so `a/b#1` and `c/d#1`
//! collapse into whichever appears first.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::github_types::RepoRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceTarget {
    Issue { repo: RepoRef, number: u64 },
    Commit { repo: RepoRef, sha: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub key: String,
    pub target: ReferenceTarget,
}

fn issue_reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:([A-Za-z0-9_-]+/[A-Za-z0-9_-]+))?#([0-9]+)")
            .expect("issue reference pattern compiles")
    })
}

fn commit_sha_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[A-Fa-f0-9]{6,}").expect("commit sha pattern compiles"))
}

/// Returns references in first-seen order, one per identity key.
pub fn extract_references(text: &str, default_repo: &RepoRef) -> Vec<Reference> {
    let mut seen = HashSet::new();
    let mut references = Vec::new();

    for captures in issue_reference_pattern().captures_iter(text) {
        let digits = &captures[2];
        let Ok(number) = digits.parse::<u64>() else {
            debug!(digits, "issue reference out of range, skipping");
            continue;
        };
        let repo = captures
            .get(1)
            .and_then(|slug| RepoRef::parse(slug.as_str()).ok())
            .unwrap_or_else(|| default_repo.clone());
        if seen.insert(digits.to_string()) {
            references.push(Reference {
                key: digits.to_string(),
                target: ReferenceTarget::Issue { repo, number },
            });
        }
    }

    for token in commit_sha_pattern().find_iter(text) {
        let sha = token.as_str();
        if seen.insert(sha.to_string()) {
            references.push(Reference {
                key: sha.to_string(),
                target: ReferenceTarget::Commit {
                    repo: default_repo.clone(),
                    sha: sha.to_string(),
                },
            });
        }
    }

    references
}
