use std::sync::Arc;

use pstatus_core::codec;
use pstatus_core::domain::status::PipelineState;
use pstatus_driver::{BuildIdentity, DriverError, StatusDriver};
use pstatus_store::InMemoryStore;
use uuid::Uuid;

struct Fixture {
    store: InMemoryStore,
    key: String,
}

impl Fixture {
    fn new() -> Self {
        Self {
            store: InMemoryStore::new(),
            key: Uuid::new_v4().to_string(),
        }
    }

    fn driver(&self) -> StatusDriver {
        let identity = BuildIdentity::new("test-pipeline", "test-team")
            .with_build("test-job", "10")
            .with_external_url("https://concourse.example.com");
        StatusDriver::new(Arc::new(self.store.clone()), self.key.clone(), identity)
    }

    fn put_status(&self, build: &str, state: &str) {
        self.store.insert(
            self.key.clone(),
            format!(
                "pipeline: test-pipeline\nteam: test-team\nbuild: \"{build}\"\nlast_modified: 2017-03-14T23:33:45-0700\nstate: {state}\n"
            ),
        );
    }
}

#[tokio::test]
async fn test_finish_is_idempotent() {
    let fixture = Fixture::new();
    let driver = fixture.driver();
    driver.start().await.unwrap();
    let finished = driver.finish().await.unwrap();
    let stored = fixture.store.get(&fixture.key);

    let again = driver.finish().await.unwrap();

    assert_eq!(again, finished);
    assert_eq!(fixture.store.get(&fixture.key), stored);
}

#[tokio::test]
async fn test_build_numbers_increase_by_one_per_cycle() {
    let fixture = Fixture::new();
    fixture.put_status("40", "READY");
    let driver = fixture.driver();

    for n in 1..=5 {
        let started = driver.start().await.unwrap();
        assert_eq!(started.build_number, (40 + n).to_string());

        let finished = driver.finish().await.unwrap();
        assert_eq!(finished.build_number, started.build_number);
    }

    let status = driver.load().await.unwrap().unwrap();
    assert_eq!(status.build_number, "45");
    assert_eq!(status.state, PipelineState::Ready);
}

#[tokio::test]
async fn test_check_with_ready_status() {
    let fixture = Fixture::new();
    fixture.put_status("124", "READY");

    assert_eq!(fixture.driver().check("123").await.unwrap(), vec!["124"]);
    assert_eq!(fixture.driver().check("124").await.unwrap(), vec!["124"]);
    assert_eq!(fixture.driver().check("").await.unwrap(), vec!["124"]);
}

#[tokio::test]
async fn test_check_without_document() {
    let fixture = Fixture::new();

    assert_eq!(fixture.driver().check("").await.unwrap(), vec!["1"]);

    let with_initial = fixture
        .driver()
        .with_initial_version(Some("1098".to_string()));
    assert_eq!(with_initial.check("").await.unwrap(), vec!["1098"]);

    assert!(fixture.driver().check("123").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_start_then_fail() {
    let fixture = Fixture::new();
    let driver = fixture.driver();

    let started = driver.start().await.unwrap();
    let failed = driver.fail().await.unwrap();

    assert_eq!(failed.state, PipelineState::Ready);
    assert_eq!(failed.build_number, started.build_number);
    let failure = failed.failure.as_ref().unwrap();
    assert_eq!(
        failure.details_url,
        "https://concourse.example.com/teams/test-team/pipelines/test-pipeline/jobs/test-job/builds/10"
    );

    let stored = codec::decode(&fixture.store.get(&fixture.key).unwrap()).unwrap();
    assert_eq!(stored, failed);
}

#[tokio::test]
async fn test_fail_on_ready_document_is_rejected() {
    let fixture = Fixture::new();
    fixture.put_status("7", "READY");
    let before = fixture.store.get(&fixture.key);

    let result = fixture.driver().fail().await;

    assert!(matches!(result, Err(DriverError::InvalidTransition(_))));
    assert_eq!(fixture.store.get(&fixture.key), before);
    assert_eq!(fixture.store.write_count(), 0);
}

#[tokio::test]
async fn test_double_fail_is_rejected() {
    let fixture = Fixture::new();
    let driver = fixture.driver();
    driver.start().await.unwrap();
    driver.fail().await.unwrap();
    let before = fixture.store.get(&fixture.key);

    assert!(matches!(
        driver.fail().await,
        Err(DriverError::InvalidTransition(_))
    ));
    assert_eq!(fixture.store.get(&fixture.key), before);
}

#[tokio::test]
async fn test_start_after_fail_clears_failure() {
    let fixture = Fixture::new();
    let driver = fixture.driver();
    driver.start().await.unwrap();
    driver.fail().await.unwrap();

    let restarted = driver.start().await.unwrap();

    assert_eq!(restarted.build_number, "2");
    assert!(restarted.failure.is_none());
}

#[tokio::test]
async fn test_racing_writers_last_writer_wins() {
    // Two invocations read the same READY document before either writes
    let fixture = Fixture::new();
    fixture.put_status("9", "READY");
    let first = fixture.driver();
    let second = fixture.driver();

    let observed = first.load().await.unwrap().unwrap();
    assert_eq!(observed.build_number, "9");

    let a = first.start().await.unwrap();
    fixture.put_status("9", "READY");
    let b = second.start().await.unwrap();

    assert_eq!(a.build_number, "10");
    assert_eq!(b.build_number, "10");
    assert_eq!(fixture.store.write_count(), 2);
}
