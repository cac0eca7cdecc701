use chrono::{TimeZone, Utc};
use cms_unpublisher::adapters::report::write_report;
use cms_unpublisher::config::settings::ApiSettings;
use cms_unpublisher::core::TokioSleeper;
use cms_unpublisher::{
    ContentstackClient, Credentials, RetryPolicy, RunMode, RunOptions, RunOutcome, Workflow,
};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

fn workflow(server: &MockServer, mode: RunMode) -> Workflow<ContentstackClient, TokioSleeper> {
    let settings = ApiSettings {
        delivery_url: server.url("/v3"),
        management_url: server.url("/v3"),
        timeout_seconds: 5,
        page_size: 100,
    };
    let credentials = Credentials {
        api_key: "stack-key".to_string(),
        delivery_token: "delivery-token".to_string(),
        management_token: Some("management-token".to_string()),
    };
    let client = ContentstackClient::new(&settings, credentials).unwrap();

    let threshold = Utc.with_ymd_and_hms(2022, 2, 16, 0, 0, 0).unwrap();
    let options = RunOptions {
        mode,
        retry: RetryPolicy::unbounded(Duration::from_millis(1)),
        ..RunOptions::new(threshold, "production", "en-us")
    };

    Workflow::new(client, TokioSleeper, options)
}

async fn mock_content_types(server: &MockServer, uids: &[&str]) {
    let content_types: Vec<_> = uids.iter().map(|uid| json!({ "uid": uid })).collect();
    let count = content_types.len();
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v3/content_types");
            then.status(200)
                .json_body(json!({ "content_types": content_types, "count": count }));
        })
        .await;
}

#[tokio::test]
async fn test_failed_content_type_does_not_stop_others() {
    let server = MockServer::start_async().await;
    mock_content_types(&server, &["page", "article"]).await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/v3/content_types/page/entries");
            then.status(500).json_body(json!({ "error_message": "Internal error" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v3/content_types/article/entries");
            then.status(200).json_body(json!({
                "entries": [
                    {"uid": "stale", "title": "Old news", "created_at": "2022-02-15T23:00:00.000Z"},
                    {"uid": "fresh", "title": "New post", "created_at": "2022-02-16T00:00:01.000Z"}
                ],
                "count": 2
            }));
        })
        .await;
    let unpublish_stale = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v3/content_types/article/entries/stale/unpublish");
            then.status(200)
                .json_body(json!({ "notice": "Entry sent for unpublishing." }));
        })
        .await;
    let unpublish_fresh = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v3/content_types/article/entries/fresh/unpublish");
            then.status(200).json_body(json!({}));
        })
        .await;

    let report = workflow(&server, RunMode::Live).run().await;

    unpublish_stale.assert_async().await;
    unpublish_fresh.assert_hits_async(0).await;
    assert_eq!(report.outcome, RunOutcome::CompletedWithErrors);
    assert_eq!(report.summary.content_type_failures, 1);
    assert_eq!(report.summary.unpublished, 1);
    assert_eq!(report.summary.skipped, 1);
}

#[tokio::test]
async fn test_dry_run_never_posts() {
    let server = MockServer::start_async().await;
    mock_content_types(&server, &["article"]).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v3/content_types/article/entries");
            then.status(200).json_body(json!({
                "entries": [
                    {"uid": "a1", "title": "Old", "created_at": "2019-01-01T00:00:00.000Z"}
                ],
                "count": 1
            }));
        })
        .await;
    let any_post = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).json_body(json!({}));
        })
        .await;

    let report = workflow(&server, RunMode::DryRun).run().await;

    any_post.assert_hits_async(0).await;
    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.summary.stale, 1);
    assert_eq!(report.summary.unpublished, 0);
}

#[tokio::test]
async fn test_content_type_listing_error_aborts() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v3/content_types");
            then.status(401).json_body(json!({
                "error_message": "API key is invalid",
                "error_code": 109
            }));
        })
        .await;
    let entries = server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/entries");
            then.status(200).json_body(json!({ "entries": [] }));
        })
        .await;

    let report = workflow(&server, RunMode::Live).run().await;

    entries.assert_hits_async(0).await;
    assert_eq!(report.outcome, RunOutcome::AbortedFatal);
    assert!(report.decisions.is_empty());
    assert!(report.fatal_error.unwrap().contains("API key is invalid"));
}

#[tokio::test]
async fn test_decisions_written_to_report() {
    let server = MockServer::start_async().await;
    mock_content_types(&server, &["article"]).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v3/content_types/article/entries");
            then.status(200).json_body(json!({
                "entries": [
                    {"uid": "a1", "title": "Old", "created_at": "2019-01-01T00:00:00.000Z"},
                    {"uid": "a2", "title": "Broken", "created_at": "someday"}
                ],
                "count": 2
            }));
        })
        .await;

    let report = workflow(&server, RunMode::DryRun).run().await;
    assert_eq!(report.outcome, RunOutcome::CompletedWithErrors);

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("decisions.csv");
    write_report(&path, &report.decisions).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "content_type,entry_uid,title,created_at,action");
    assert!(lines[1].starts_with("article,a1,Old,"));
    assert!(lines[1].ends_with(",would-unpublish"));
    assert!(lines[2].ends_with(",malformed"));
    assert!(!content.contains("delivery-token"));
}
