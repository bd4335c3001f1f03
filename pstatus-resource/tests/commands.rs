//! End-to-end tests of the resource commands against an in-memory store

use pstatus_core::codec;
use pstatus_core::domain::status::PipelineState;
use pstatus_core::dto::Version;
use pstatus_core::dto::check::CheckRequest;
use pstatus_core::dto::get::InRequest;
use pstatus_core::dto::put::OutRequest;
use pstatus_core::dto::source::Source;
use pstatus_driver::BuildIdentity;
use pstatus_resource::commands::{run_check, run_in, run_out};
use pstatus_resource::config::ResourceConfig;
use pstatus_store::{InMemoryStore, Store};
use std::sync::Arc;
use std::time::Duration;

const KEY: &str = "pipelines/main";

fn source() -> Source {
    Source {
        bucket: "status-bucket".to_string(),
        key: KEY.to_string(),
        initial_version: "100".to_string(),
        ..Source::default()
    }
}

fn identity(build_name: &str) -> BuildIdentity {
    BuildIdentity::new("deploy", "main")
        .with_build("unit", build_name)
        .with_external_url("https://ci.example.com")
}

fn store_handle(store: &InMemoryStore) -> Arc<dyn Store> {
    Arc::new(store.clone())
}

fn out_request(source: Source, action: &str) -> OutRequest {
    let mut request: OutRequest =
        serde_json::from_value(serde_json::json!({"params": {"action": action}})).unwrap();
    request.source = source;
    request
}

async fn out(store: &InMemoryStore, source: Source, action: &str) -> anyhow::Result<String> {
    let config = ResourceConfig::from_source(&source)?;
    let response = run_out(
        &config,
        store_handle(store),
        identity("7"),
        &out_request(source, action),
    )
    .await?;
    Ok(response.version.number)
}

async fn check(store: &InMemoryStore, cursor: Option<&str>) -> Vec<Version> {
    let source = source();
    let config = ResourceConfig::from_source(&source).unwrap();
    let request = CheckRequest {
        source,
        version: cursor.map(Version::new),
    };
    run_check(&config, store_handle(store), identity("7"), &request)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_check_before_any_build_reports_initial_version() {
    let store = InMemoryStore::new();

    assert_eq!(check(&store, None).await, vec![Version::new("100")]);
    assert!(check(&store, Some("100")).await.is_empty());
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_full_lifecycle() {
    let store = InMemoryStore::new();

    assert_eq!(out(&store, source(), "start").await.unwrap(), "100");
    assert!(check(&store, None).await.is_empty());

    assert_eq!(out(&store, source(), "finish").await.unwrap(), "100");
    assert_eq!(check(&store, Some("99")).await, vec![Version::new("100")]);
    assert_eq!(check(&store, Some("100")).await, vec![Version::new("100")]);
    assert!(check(&store, Some("101")).await.is_empty());

    assert_eq!(out(&store, source(), "start").await.unwrap(), "101");
    assert_eq!(out(&store, source(), "fail").await.unwrap(), "101");

    let status = codec::decode(&store.get(KEY).unwrap()).unwrap();
    assert_eq!(status.state, PipelineState::Ready);
    assert_eq!(status.build_number, "101");
    let failure = status.failure.unwrap();
    assert_eq!(failure.job_name, "unit");
    assert_eq!(failure.build_name, "7");
    assert_eq!(
        failure.details_url,
        "https://ci.example.com/teams/main/pipelines/deploy/jobs/unit/builds/7"
    );
}

#[tokio::test]
async fn test_finish_without_document_fails() {
    let store = InMemoryStore::new();

    let err = out(&store, source(), "finish").await.unwrap_err();
    assert!(format!("{:#}", err).starts_with("finishing pipeline"));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_start_with_foreign_document_fails() {
    let store = InMemoryStore::new();
    store.insert(KEY, "pipeline: other\nteam: main\nbuild: \"3\"\nstate: READY\n");

    let err = out(&store, source(), "start").await.unwrap_err();
    assert!(format!("{:#}", err).starts_with("starting pipeline"));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_store_failure_is_reported() {
    let store = InMemoryStore::new();
    store.set_failure(Some("bucket unreachable"));

    let err = out(&store, source(), "start").await.unwrap_err();
    assert!(format!("{:#}", err).contains("bucket unreachable"));
}

#[tokio::test]
async fn test_encryption_is_applied_to_writes() {
    let store = InMemoryStore::new();
    let mut source = source();
    source.server_side_encryption = "AES256".to_string();

    out(&store, source, "start").await.unwrap();
    let options = store.last_write_options().unwrap();
    assert_eq!(options.encryption.as_deref(), Some("AES256"));
}

#[tokio::test(start_paused = true)]
async fn test_start_waits_for_running_build_when_required() {
    let store = InMemoryStore::new();
    out(&store, source(), "start").await.unwrap();

    let finisher = {
        let store = store.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(45)).await;
            out(&store, source(), "finish").await.unwrap();
        })
    };

    let mut waiting = source();
    waiting.require_ready = true;
    waiting.retry_after = "10s".to_string();

    let started = tokio::time::Instant::now();
    assert_eq!(out(&store, waiting, "start").await.unwrap(), "101");
    assert!(started.elapsed() >= Duration::from_secs(45));
    finisher.await.unwrap();
}

#[tokio::test]
async fn test_start_without_require_ready_does_not_wait() {
    let store = InMemoryStore::new();
    out(&store, source(), "start").await.unwrap();

    // Starting a running pipeline is a no-op
    assert_eq!(out(&store, source(), "start").await.unwrap(), "100");
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn test_in_writes_status_file() {
    let store = InMemoryStore::new();
    out(&store, source(), "start").await.unwrap();
    out(&store, source(), "finish").await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("nested").join("status-dir");
    let source = source();
    let config = ResourceConfig::from_source(&source).unwrap();
    let request = InRequest {
        source,
        version: Some(Version::new("100")),
        params: serde_json::Value::Null,
    };

    let response = run_in(
        &config,
        store_handle(&store),
        identity("7"),
        &request,
        &destination,
    )
    .await
    .unwrap();

    assert_eq!(response.version.number, "100");
    assert_eq!(response.metadata[0].name, "number");
    assert_eq!(response.metadata[0].value, "100");

    let written = std::fs::read(destination.join("status")).unwrap();
    let status = codec::decode(&written).unwrap();
    assert_eq!(status.pipeline, "deploy");
    assert_eq!(status.team, "main");
    assert!(status.is_ready());
}

#[tokio::test]
async fn test_in_without_document_echoes_requested_version() {
    let store = InMemoryStore::new();
    let dir = tempfile::tempdir().unwrap();
    let source = source();
    let config = ResourceConfig::from_source(&source).unwrap();
    let request = InRequest {
        source,
        version: Some(Version::new("100")),
        params: serde_json::Value::Null,
    };

    let response = run_in(&config, store_handle(&store), identity("7"), &request, dir.path())
        .await
        .unwrap();

    assert_eq!(response.version.number, "100");
    assert!(dir.path().join("status").exists());
    assert_eq!(store.write_count(), 0);
}
