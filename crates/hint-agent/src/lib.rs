//! Issue question answering agent.
//!
//! Gathers labels, linked issues, commits and search results for a question,
//! fits them into the model's input budget and publishes the model's answer
//! as an issue comment.

pub mod bootstrap_helpers;
pub mod budget;
pub mod cli_args;
pub mod config;
pub mod evidence_set;
pub mod pipeline;
pub mod planner;
pub mod prompts;
pub mod publisher;
pub mod search;

pub use budget::{evidence_token_budget, trim_to_token_limit};
pub use cli_args::Cli;
pub use config::{ConfigError, HintConfig, RulesSource};
pub use evidence_set::{EvidenceJob, EvidenceSet, ResolvedEvidence};
pub use pipeline::{run_hint, RunOutcome};
pub use planner::{parse_planner_response, PlannerDirective, SearchDirective};
pub use publisher::{is_own_comment, publish_answer, PublishOutcome};
