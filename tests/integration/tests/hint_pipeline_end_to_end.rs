use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use hint_agent::{run_hint, HintConfig, PublishOutcome, RulesSource, RunOutcome};
use hint_ai::{
    GenerateRequest, GoogleClient, GoogleConfig, HintAiError, LanguageModel, TokenBudget,
};
use hint_github::{GithubApiClient, RepoRef};
use httpmock::prelude::*;
use serde_json::json;
use tempfile::NamedTempFile;

const RULES: &str = "Plan the search.\n---\nAnswer briefly.\n";
const AI_KEY: &str = "test-google-key-000000000000000000000000";

/// Language model double: one token per four characters, scripted completions.
struct ScriptedModel {
    budget: TokenBudget,
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedModel {
    fn new(input_tokens: u64, responses: &[&str]) -> Self {
        Self {
            budget: TokenBudget {
                input_tokens,
                output_tokens: 512,
            },
            responses: Mutex::new(responses.iter().map(|item| item.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

fn measure(text: &str) -> u64 {
    text.chars().count().div_ceil(4) as u64
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn token_limits(&self) -> Result<TokenBudget, HintAiError> {
        Ok(self.budget)
    }

    async fn count_tokens(&self, text: &str) -> Result<u64, HintAiError> {
        Ok(measure(text))
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, HintAiError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request);
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .ok_or_else(|| HintAiError::InvalidResponse("scripted responses exhausted".into()))
    }
}

fn rules_file() -> NamedTempFile {
    let file = NamedTempFile::new().expect("rules file");
    std::fs::write(file.path(), RULES).expect("write rules");
    file
}

fn config_for(server: &MockServer, rules: &NamedTempFile) -> HintConfig {
    let repo = RepoRef::parse("owner/repo").expect("valid slug");
    HintConfig {
        github_api_base: server.base_url(),
        github_token: "gh-token".to_string(),
        repo: repo.clone(),
        issue_number: 7,
        search_repo: repo,
        bot_name: "AI Hint".to_string(),
        ai_api_base: server.base_url(),
        ai_token: AI_KEY.to_string(),
        ai_model: "gemini-pro".to_string(),
        rules: RulesSource::File(rules.path().to_path_buf()),
        request_timeout_ms: 5_000,
    }
}

fn github_for(server: &MockServer) -> GithubApiClient {
    GithubApiClient::new(&server.base_url(), "gh-token", 5_000).expect("github client")
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid date")
}

fn mock_question_context(server: &MockServer, body: &str) {
    server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/labels");
        then.status(200).json_body(json!([
            {"name": "bug", "description": "Something is broken"}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo");
        then.status(200)
            .json_body(json!({"full_name": "owner/repo", "description": "A demo tool"}));
    });
    let comments_url = format!("{}/repos/owner/repo/issues/7/comments", server.base_url());
    server.mock(|when, then| {
        when.method(GET)
            .path("/repos/owner/repo/issues/7")
            .header("authorization", "Bearer gh-token");
        then.status(200).json_body(json!({
            "id": 5007,
            "number": 7,
            "title": "Why does it crash",
            "body": body,
            "user": {"login": "asker", "type": "User"},
            "comments": 0,
            "comments_url": comments_url
        }));
    });
}

fn referenced_issue_body(body: &str) -> serde_json::Value {
    json!({
        "id": 5042,
        "number": 42,
        "title": "Crash on start",
        "body": body,
        "user": {"login": "alice", "type": "User"},
        "closed_at": "2024-01-01T00:00:00Z",
        "comments": 0,
        "comments_url": "unused"
    })
}

fn referenced_commit_body() -> serde_json::Value {
    json!({
        "sha": "abc1234ffffffffffffffffffffffffffffffff",
        "commit": {
            "author": {"name": "Carol"},
            "message": "Fix startup crash",
            "comment_count": 0
        },
        "comments_url": "unused"
    })
}

#[tokio::test]
async fn integration_inline_references_are_fetched_once_and_answer_is_posted() {
    let server = MockServer::start();
    mock_question_context(
        &server,
        "Started after owner/repo#42 and abc1234. Again: #42, abc1234.",
    );
    let issue_ref = server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/issues/42");
        then.status(200)
            .json_body(referenced_issue_body("Stack trace attached"));
    });
    let commit_ref = server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/commits/abc1234");
        then.status(200).json_body(referenced_commit_body());
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/issues/7/comments");
        then.status(200).json_body(json!([]));
    });
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/owner/repo/issues/7/comments")
            .json_body_includes(
                json!({"body": "AI Hint:\nUpgrade to the fixed release."}).to_string(),
            );
        then.status(201).json_body(json!({"id": 9001}));
    });

    let rules = rules_file();
    let config = config_for(&server, &rules);
    let model = ScriptedModel::new(30_720, &["No search needed", "Upgrade to the fixed release."]);
    let outcome = run_hint(&config, &github_for(&server), &model, now())
        .await
        .expect("run should succeed");

    issue_ref.assert_calls(1);
    commit_ref.assert_calls(1);
    create.assert();
    assert_eq!(
        outcome,
        RunOutcome::Published(PublishOutcome::Created { comment_id: 9001 })
    );

    let requests = model.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].prompt.contains("Repo: {A demo tool}"));
    assert!(requests[0].prompt.contains("Plan the search.\n"));
    assert_eq!(requests[0].max_output_tokens, 100);
    assert_eq!(
        requests[1].prompt,
        "{Closed Issue: Crash on start\nNumber: 42\nalice:\nStack trace attached\n\n}\
         {Commit: Carol\nSha: abc1234ffffffffffffffffffffffffffffffff\nFix startup crash\n\n}\
         \n{Prompt:\nWhy does it crash\nStarted after owner/repo#42 and abc1234. Again: #42, abc1234.}\
         \n\nDate: 2024-05-01T12:00:00.000Z\n\nAnswer briefly.\n\nAnswer:\n"
    );
    assert_eq!(requests[1].max_output_tokens, 512);
}

#[tokio::test]
async fn integration_oversized_evidence_is_trimmed_to_the_input_ceiling() {
    let server = MockServer::start();
    mock_question_context(&server, "See owner/repo#42 and abc1234");
    server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/issues/42");
        then.status(200)
            .json_body(referenced_issue_body(&"log line\n".repeat(2_000)));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/commits/abc1234");
        then.status(200).json_body(referenced_commit_body());
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/issues/7/comments");
        then.status(200).json_body(json!([]));
    });
    server.mock(|when, then| {
        when.method(POST).path("/repos/owner/repo/issues/7/comments");
        then.status(201).json_body(json!({"id": 9002}));
    });

    let rules = rules_file();
    let config = config_for(&server, &rules);
    let input_ceiling = 300;
    let model = ScriptedModel::new(input_ceiling, &["Nothing", "Short answer"]);
    run_hint(&config, &github_for(&server), &model, now())
        .await
        .expect("run should succeed");

    let requests = model.requests();
    let answer_prompt = &requests[1].prompt;
    assert!(measure(answer_prompt) <= input_ceiling);
    assert!(answer_prompt.starts_with("{Closed Issue: Crash on start\nNumber: 42\n"));
    assert!(answer_prompt.ends_with("Answer:\n"));
    assert!(!answer_prompt.contains("{Commit: Carol"));
}

#[tokio::test]
async fn integration_rejected_question_posts_nothing() {
    let server = MockServer::start();
    mock_question_context(&server, "What is the weather like? See #42");
    let issue_ref = server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/issues/42");
        then.status(200).json_body(referenced_issue_body("unused"));
    });
    let list = server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/issues/7/comments");
        then.status(200).json_body(json!([]));
    });
    let create = server.mock(|when, then| {
        when.method(POST).path("/repos/owner/repo/issues/7/comments");
        then.status(201).json_body(json!({"id": 1}));
    });

    let rules = rules_file();
    let config = config_for(&server, &rules);
    let model = ScriptedModel::new(30_720, &["Off topic. #reject#"]);
    let outcome = run_hint(&config, &github_for(&server), &model, now())
        .await
        .expect("rejection is not an error");

    assert_eq!(outcome, RunOutcome::Rejected);
    assert_eq!(model.requests().len(), 1);
    issue_ref.assert_calls(0);
    list.assert_calls(0);
    create.assert_calls(0);
}

#[tokio::test]
async fn integration_missing_reference_contributes_no_evidence() {
    let server = MockServer::start();
    mock_question_context(&server, "Related to #404");
    let missing = server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/issues/404");
        then.status(404).json_body(json!({"message": "Not Found"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/issues/7/comments");
        then.status(200).json_body(json!([]));
    });
    server.mock(|when, then| {
        when.method(POST).path("/repos/owner/repo/issues/7/comments");
        then.status(201).json_body(json!({"id": 9003}));
    });

    let rules = rules_file();
    let config = config_for(&server, &rules);
    let model = ScriptedModel::new(30_720, &["Nothing", "No context available"]);
    let outcome = run_hint(&config, &github_for(&server), &model, now())
        .await
        .expect("run should succeed");

    missing.assert();
    assert_eq!(
        outcome,
        RunOutcome::Published(PublishOutcome::Created { comment_id: 9003 })
    );
    assert!(model.requests()[1].prompt.starts_with("\n{Prompt:\n"));
}

#[tokio::test]
async fn integration_search_hits_feed_evidence_and_previous_answer_is_edited() {
    let server = MockServer::start();
    mock_question_context(&server, "It crashes on boot");
    let commit_search = server.mock(|when, then| {
        when.method(GET)
            .path("/search/commits")
            .query_param("q", "repo:owner/repo fix crash")
            .query_param("per_page", "20");
        then.status(200).json_body(json!({
            "total_count": 1,
            "items": [{
                "sha": "feedbeef",
                "commit": {"author": {"name": "Dan"}, "message": "Fix crash on boot", "comment_count": 0},
                "comments_url": "unused"
            }]
        }));
    });
    let thread_url = format!("{}/repos/owner/repo/issues/3/comments", server.base_url());
    let issue_search = server.mock(|when, then| {
        when.method(GET)
            .path("/search/issues")
            .query_param("q", "repo:owner/repo is:issue crash")
            .query_param("per_page", "10");
        then.status(200).json_body(json!({
            "total_count": 1,
            "items": [{
                "id": 5003,
                "number": 3,
                "title": "Boot crash",
                "body": "Happens on boot",
                "user": {"login": "erin", "type": "User"},
                "pull_request": {"merged_at": "2024-02-02T00:00:00Z"},
                "closed_at": "2024-02-02T00:00:00Z",
                "comments": 1,
                "comments_url": thread_url
            }]
        }));
    });
    let thread = server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/issues/3/comments");
        then.status(200).json_body(json!([
            {"id": 1, "body": "Merged, thanks", "user": {"login": "maint", "type": "User"}}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/issues/7/comments");
        then.status(200).json_body(json!([
            {"id": 700, "body": "AI Hint:\nold answer", "user": {"login": "github-actions[bot]", "type": "Bot"}}
        ]));
    });
    let update = server.mock(|when, then| {
        when.method(PATCH)
            .path("/repos/owner/repo/issues/comments/700")
            .json_body_includes(json!({"body": "AI Hint:\nSee the merged fix."}).to_string());
        then.status(200).json_body(json!({"id": 700}));
    });

    let rules = rules_file();
    let config = config_for(&server, &rules);
    let model = ScriptedModel::new(
        9_000,
        &["Commits: fix crash\nIssues: is:issue crash", "See the merged fix."],
    );
    let outcome = run_hint(&config, &github_for(&server), &model, now())
        .await
        .expect("run should succeed");

    commit_search.assert();
    issue_search.assert();
    thread.assert_calls(1);
    update.assert();
    assert_eq!(
        outcome,
        RunOutcome::Published(PublishOutcome::Updated { comment_id: 700 })
    );
    assert!(model.requests()[1].prompt.starts_with(
        "{Commit: Dan\nSha: feedbeef\nFix crash on boot\n\n}\
         {Merged Pull Request: Boot crash\nNumber: 3\nerin:\nHappens on boot\n\nmaint:\nMerged, thanks\n\n}"
    ));
}

#[tokio::test]
async fn integration_google_client_drives_the_pipeline_over_http() {
    let server = MockServer::start();
    mock_question_context(&server, "How do I configure it?");
    server.mock(|when, then| {
        when.method(GET)
            .path("/models/gemini-pro")
            .query_param("key", AI_KEY);
        then.status(200).json_body(json!({
            "name": "models/gemini-pro",
            "inputTokenLimit": 30720,
            "outputTokenLimit": 2048
        }));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/models/gemini-pro:countTokens")
            .query_param("key", AI_KEY);
        then.status(200).json_body(json!({"totalTokens": 40}));
    });
    let planner = server.mock(|when, then| {
        when.method(POST)
            .path("/models/gemini-pro:generateContent")
            .body_includes("Github search:")
            .json_body_includes(json!({"generationConfig": {"maxOutputTokens": 100}}).to_string());
        then.status(200).json_body(json!({
            "candidates": [{"content": {"parts": [{"text": "No search"}]}}]
        }));
    });
    let answer = server.mock(|when, then| {
        when.method(POST)
            .path("/models/gemini-pro:generateContent")
            .body_includes("Answer:")
            .json_body_includes(json!({"generationConfig": {"maxOutputTokens": 2048}}).to_string());
        then.status(200).json_body(json!({
            "candidates": [{"content": {"parts": [{"text": "Set the flag."}]}}]
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/owner/repo/issues/7/comments");
        then.status(200).json_body(json!([]));
    });
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/owner/repo/issues/7/comments")
            .json_body_includes(json!({"body": "AI Hint:\nSet the flag."}).to_string());
        then.status(201).json_body(json!({"id": 9004}));
    });

    let rules = rules_file();
    let config = config_for(&server, &rules);
    let model = GoogleClient::new(GoogleConfig {
        api_base: server.base_url(),
        api_key: AI_KEY.to_string(),
        model: "gemini-pro".to_string(),
        request_timeout_ms: 5_000,
    })
    .expect("google client");
    let outcome = run_hint(&config, &github_for(&server), &model, now())
        .await
        .expect("run should succeed");

    planner.assert();
    answer.assert();
    create.assert();
    assert_eq!(
        outcome,
        RunOutcome::Published(PublishOutcome::Created { comment_id: 9004 })
    );
}
