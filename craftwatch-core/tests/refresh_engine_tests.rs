// craftwatch-core/tests/refresh_engine_tests.rs
//
// Engine tests run against the real sqlite repository (in memory) with
// scripted fetcher/publisher fakes at the network seams.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use craftwatch_common::Error;
use craftwatch_common::models::notification::NotificationPayload;
use craftwatch_common::models::status::StatusSnapshot;
use craftwatch_common::models::tracker::{ServerKind, TrackedKey, TrackedTarget};
use craftwatch_common::traits::platform_traits::{NotificationPublisher, StatusFetcher};
use craftwatch_common::traits::repository_traits::TrackerRepository;
use craftwatch_core::Database;
use craftwatch_core::render::Renderer;
use craftwatch_core::repositories::SqliteTrackerRepository;
use craftwatch_core::services::refresh::{RefreshEngine, RefreshOutcome};

// ---------- fakes ----------

#[derive(Clone)]
enum FetchScript {
    Online {
        players: (u32, u32),
        version: &'static str,
        motd: &'static str,
        icon: Option<Vec<u8>>,
        latency_ms: u64,
    },
    Offline,
    Fail(&'static str),
}

struct FakeFetcher {
    scripts: HashMap<String, FetchScript>,
}

impl FakeFetcher {
    fn new(scripts: impl IntoIterator<Item = (&'static str, FetchScript)>) -> Arc<Self> {
        Arc::new(Self {
            scripts: scripts
                .into_iter()
                .map(|(addr, s)| (addr.to_string(), s))
                .collect(),
        })
    }
}

#[async_trait]
impl StatusFetcher for FakeFetcher {
    async fn fetch(&self, address: &str, _kind: ServerKind) -> Result<StatusSnapshot, Error> {
        match self.scripts.get(address) {
            Some(FetchScript::Online {
                players,
                version,
                motd,
                icon,
                latency_ms,
            }) => Ok(StatusSnapshot {
                online: true,
                players_online: players.0,
                players_max: players.1,
                version: Some(version.to_string()),
                motd: Some(motd.to_string()),
                icon_bytes: icon.clone(),
                latency_ms: *latency_ms,
            }),
            Some(FetchScript::Offline) => Ok(StatusSnapshot {
                online: false,
                ..Default::default()
            }),
            Some(FetchScript::Fail(reason)) => Err(Error::Fetch(format!("{address}: {reason}"))),
            None => Err(Error::Fetch(format!("{address}: no script"))),
        }
    }
}

#[derive(Debug, Clone)]
enum PublishCall {
    Create {
        channel: String,
        payload: NotificationPayload,
    },
    Edit {
        channel: String,
        message: String,
        payload: NotificationPayload,
    },
}

#[derive(Clone, Copy)]
enum EditMode {
    Succeed,
    NotFound,
    Fail,
}

struct RecordingPublisher {
    edit_mode: EditMode,
    created_id: &'static str,
    calls: Mutex<Vec<PublishCall>>,
}

impl RecordingPublisher {
    fn new(edit_mode: EditMode, created_id: &'static str) -> Arc<Self> {
        Arc::new(Self {
            edit_mode,
            created_id,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<PublishCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationPublisher for RecordingPublisher {
    async fn create(
        &self,
        channel_id: &str,
        payload: &NotificationPayload,
    ) -> Result<String, Error> {
        self.calls.lock().unwrap().push(PublishCall::Create {
            channel: channel_id.to_string(),
            payload: payload.clone(),
        });
        Ok(self.created_id.to_string())
    }

    async fn edit(
        &self,
        channel_id: &str,
        message_id: &str,
        payload: &NotificationPayload,
    ) -> Result<(), Error> {
        self.calls.lock().unwrap().push(PublishCall::Edit {
            channel: channel_id.to_string(),
            message: message_id.to_string(),
            payload: payload.clone(),
        });
        match self.edit_mode {
            EditMode::Succeed => Ok(()),
            EditMode::NotFound => Err(Error::NotFound("message no longer exists".into())),
            EditMode::Fail => Err(Error::Platform("rate limited".into())),
        }
    }
}

// ---------- harness ----------

async fn setup_repo() -> Arc<SqliteTrackerRepository> {
    let db = Database::new(":memory:").await.unwrap();
    db.migrate().await.unwrap();
    Arc::new(SqliteTrackerRepository::new(db.pool().clone()))
}

fn engine(
    repo: Arc<SqliteTrackerRepository>,
    fetcher: Arc<FakeFetcher>,
    publisher: Arc<RecordingPublisher>,
) -> RefreshEngine {
    RefreshEngine::new(repo, fetcher, Arc::new(Renderer::new(None)), publisher)
}

fn online_script() -> FetchScript {
    FetchScript::Online {
        players: (5, 20),
        version: "1.20.4",
        motd: "Welcome!",
        icon: None,
        latency_ms: 42,
    }
}

const KEY: (&str, &str, &str) = ("g1", "c1", "m1");

async fn seed(repo: &SqliteTrackerRepository) -> (TrackedKey, TrackedTarget) {
    let key = TrackedKey::new(KEY.0, KEY.1, KEY.2);
    let target = TrackedTarget {
        address: "play.example.com".to_string(),
        kind: ServerKind::Java,
    };
    repo.set(&key, &target).await.unwrap();
    (key, target)
}

// ---------- tests ----------

#[tokio::test]
async fn fetch_failure_evicts_entry_without_publishing() {
    let repo = setup_repo().await;
    seed(&repo).await;
    let fetcher = FakeFetcher::new([("play.example.com", FetchScript::Fail("timeout"))]);
    let publisher = RecordingPublisher::new(EditMode::Succeed, "m2");
    let engine = engine(repo.clone(), fetcher, publisher.clone());

    engine.refresh_all().await.unwrap();

    assert!(repo.all().await.unwrap().is_empty());
    assert!(publisher.calls().is_empty());
}

#[tokio::test]
async fn successful_edit_keeps_key_unchanged() {
    let repo = setup_repo().await;
    let (key, _) = seed(&repo).await;
    let fetcher = FakeFetcher::new([("play.example.com", online_script())]);
    let publisher = RecordingPublisher::new(EditMode::Succeed, "m2");
    let engine = engine(repo.clone(), fetcher, publisher.clone());

    engine.refresh_all().await.unwrap();

    let calls = publisher.calls();
    assert_eq!(calls.len(), 1);
    let PublishCall::Edit { channel, message, payload } = &calls[0] else {
        panic!("Expected an edit call, got {:?}", calls[0]);
    };
    assert_eq!(channel, "c1");
    assert_eq!(message, "m1");
    assert_eq!(payload.summary.status_line, "🟢 ONLINE");
    assert_eq!(payload.summary.players, "5/20");
    assert_eq!(payload.summary.version, "1.20.4");
    assert_eq!(payload.summary.ping, "42ms");

    let all = repo.all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].0, key);
}

#[tokio::test]
async fn repeated_cycles_produce_stable_payloads() {
    let repo = setup_repo().await;
    seed(&repo).await;
    let fetcher = FakeFetcher::new([("play.example.com", online_script())]);
    let publisher = RecordingPublisher::new(EditMode::Succeed, "m2");
    let engine = engine(repo.clone(), fetcher, publisher.clone());

    engine.refresh_all().await.unwrap();
    engine.refresh_all().await.unwrap();

    let calls = publisher.calls();
    assert_eq!(calls.len(), 2);
    let payloads: Vec<_> = calls
        .iter()
        .map(|c| match c {
            PublishCall::Edit { payload, .. } => payload,
            other => panic!("Expected edits only, got {:?}", other),
        })
        .collect();
    // Identical modulo the embedded timestamp.
    assert_eq!(payloads[0].summary.status_line, payloads[1].summary.status_line);
    assert_eq!(payloads[0].summary.players, payloads[1].summary.players);
    assert_eq!(payloads[0].summary.version, payloads[1].summary.version);
    assert_eq!(payloads[0].summary.ping, payloads[1].summary.ping);
    assert_eq!(payloads[0].summary.color, payloads[1].summary.color);
}

#[tokio::test]
async fn missing_message_is_recreated_and_rekeyed() {
    let repo = setup_repo().await;
    let (old_key, target) = seed(&repo).await;
    let fetcher = FakeFetcher::new([("play.example.com", online_script())]);
    let publisher = RecordingPublisher::new(EditMode::NotFound, "m2");
    let engine = engine(repo.clone(), fetcher, publisher.clone());

    engine.refresh_all().await.unwrap();

    let calls = publisher.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(&calls[0], PublishCall::Edit { .. }));
    let PublishCall::Create { channel, .. } = &calls[1] else {
        panic!("Expected a create call after the failed edit");
    };
    assert_eq!(channel, "c1");

    assert!(repo.get(&old_key).await.unwrap().is_none());
    let new_key = old_key.with_message_id("m2");
    let stored = repo.get(&new_key).await.unwrap().expect("Rekeyed entry");
    assert_eq!(stored, target);
}

#[tokio::test]
async fn other_publish_error_retains_entry() {
    let repo = setup_repo().await;
    let (key, _) = seed(&repo).await;
    let fetcher = FakeFetcher::new([("play.example.com", online_script())]);
    let publisher = RecordingPublisher::new(EditMode::Fail, "m2");
    let engine = engine(repo.clone(), fetcher, publisher.clone());

    // refresh_all absorbs the per-entry failure and keeps going.
    engine.refresh_all().await.unwrap();

    let calls = publisher.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], PublishCall::Edit { .. }));

    let all = repo.all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].0, key);
}

#[tokio::test]
async fn failing_entry_does_not_stop_the_cycle() {
    let repo = setup_repo().await;
    let key_a = TrackedKey::new("g1", "c1", "m1");
    let key_b = TrackedKey::new("g1", "c2", "m5");
    repo.set(&key_a, &TrackedTarget { address: "down.example.com".into(), kind: ServerKind::Java })
        .await
        .unwrap();
    repo.set(&key_b, &TrackedTarget { address: "up.example.com".into(), kind: ServerKind::Bedrock })
        .await
        .unwrap();

    let fetcher = FakeFetcher::new([
        ("down.example.com", FetchScript::Fail("unreachable")),
        ("up.example.com", online_script()),
    ]);
    let publisher = RecordingPublisher::new(EditMode::Succeed, "m2");
    let engine = engine(repo.clone(), fetcher, publisher.clone());

    engine.refresh_all().await.unwrap();

    // Failing entry evicted, healthy entry still refreshed.
    let all = repo.all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].0, key_b);
    assert_eq!(publisher.calls().len(), 1);
}

#[tokio::test]
async fn missing_icon_still_publishes_summary() {
    let repo = setup_repo().await;
    seed(&repo).await;
    // icon: None models a failed icon download upstream.
    let fetcher = FakeFetcher::new([("play.example.com", online_script())]);
    let publisher = RecordingPublisher::new(EditMode::Succeed, "m2");
    let engine = engine(repo.clone(), fetcher, publisher.clone());

    engine.refresh_all().await.unwrap();

    let calls = publisher.calls();
    let PublishCall::Edit { payload, .. } = &calls[0] else {
        panic!("Expected an edit call");
    };
    assert!(payload.icon_image.is_none());
    assert_eq!(payload.summary.players, "5/20");
}

#[tokio::test]
async fn offline_server_publishes_normalized_payload() {
    let repo = setup_repo().await;
    seed(&repo).await;
    let fetcher = FakeFetcher::new([("play.example.com", FetchScript::Offline)]);
    let publisher = RecordingPublisher::new(EditMode::Succeed, "m2");
    let engine = engine(repo.clone(), fetcher, publisher.clone());

    engine.refresh_all().await.unwrap();

    let calls = publisher.calls();
    assert_eq!(calls.len(), 1);
    let PublishCall::Edit { payload, .. } = &calls[0] else {
        panic!("Expected an edit call");
    };
    assert_eq!(payload.summary.status_line, "🔴 OFFLINE");
    assert_eq!(payload.summary.players, "0/0");
    assert_eq!(payload.summary.version, "Unknown");
    assert!(payload.motd_image.is_none());
    assert!(payload.icon_image.is_none());

    // Offline is a valid status, not a fetch failure: entry retained.
    assert_eq!(repo.all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn track_new_publishes_and_persists() {
    let repo = setup_repo().await;
    let fetcher = FakeFetcher::new([("play.example.com", online_script())]);
    let publisher = RecordingPublisher::new(EditMode::Succeed, "m77");
    let engine = engine(repo.clone(), fetcher, publisher.clone());

    let key = engine
        .track_new("g1", "c1", "play.example.com", ServerKind::Java)
        .await
        .unwrap();

    assert_eq!(key, TrackedKey::new("g1", "c1", "m77"));
    let calls = publisher.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], PublishCall::Create { .. }));

    let stored = repo.get(&key).await.unwrap().expect("Tracker persisted");
    assert_eq!(stored.address, "play.example.com");
    assert_eq!(stored.kind, ServerKind::Java);
}

#[tokio::test]
async fn track_new_failure_stores_nothing() {
    let repo = setup_repo().await;
    let fetcher = FakeFetcher::new([("play.example.com", FetchScript::Fail("refused"))]);
    let publisher = RecordingPublisher::new(EditMode::Succeed, "m2");
    let engine = engine(repo.clone(), fetcher, publisher.clone());

    let res = engine
        .track_new("g1", "c1", "play.example.com", ServerKind::Java)
        .await;

    assert!(matches!(res, Err(Error::Fetch(_))));
    assert!(repo.all().await.unwrap().is_empty());
    assert!(publisher.calls().is_empty());
}

#[tokio::test]
async fn refresh_entry_reports_outcomes() {
    let repo = setup_repo().await;
    let (key, target) = seed(&repo).await;
    let fetcher = FakeFetcher::new([("play.example.com", online_script())]);
    let publisher = RecordingPublisher::new(EditMode::NotFound, "m2");
    let engine = engine(repo.clone(), fetcher, publisher.clone());

    let outcome = engine.refresh_entry(&key, &target).await.unwrap();
    assert_eq!(outcome, RefreshOutcome::Recreated(key.with_message_id("m2")));
}
