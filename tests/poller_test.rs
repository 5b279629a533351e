//! Tests for the headless poller: fixed-delay scheduling, shutdown, and the
//! HTTP client against a live router.
//!
//! Run with: cargo test --test poller_test

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::Instant;

use reef_monitor::common::AppState;
use reef_monitor::config::Config;
use reef_monitor::poller::{
    PollError, PollOutcome, Poller, SnapshotClient, SnapshotSink, SnapshotSource,
};
use reef_monitor::routes::{self, snapshot::SnapshotResponse};
use reef_monitor::store::{MemoryReadingStore, Reading};

const DELAY: Duration = Duration::from_secs(120);
const RESPONSE_TIME: Duration = Duration::from_secs(30);

/// Source that takes `RESPONSE_TIME` to answer and records when each request
/// started and how many were in flight at once.
#[derive(Clone, Default)]
struct SlowSource {
    started: Arc<Mutex<Vec<Instant>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

#[async_trait]
impl SnapshotSource for SlowSource {
    async fn fetch(&self) -> PollOutcome {
        self.started.lock().unwrap().push(Instant::now());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(RESPONSE_TIME).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Err(PollError::EmptyStore)
    }
}

#[derive(Default)]
struct RecordingSink {
    rendered: Vec<Instant>,
    empty: usize,
}

impl SnapshotSink for RecordingSink {
    fn render(&mut self, outcome: &PollOutcome) {
        self.rendered.push(Instant::now());
        if matches!(outcome, Err(PollError::EmptyStore)) {
            self.empty += 1;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn polls_on_a_fixed_delay_after_each_render() {
    let source = SlowSource::default();
    let origin = Instant::now();

    let sink = Poller::new(source.clone(), RecordingSink::default(), DELAY)
        .run(tokio::time::sleep(Duration::from_secs(400)))
        .await;

    let started: Vec<u64> = source
        .started
        .lock()
        .unwrap()
        .iter()
        .map(|i| i.duration_since(origin).as_secs())
        .collect();

    // Each poll starts a full delay after the previous response, not on a
    // fixed 120s grid.
    assert_eq!(started, vec![0, 150, 300]);
    assert_eq!(sink.rendered.len(), 3);
    assert_eq!(sink.empty, 3);
    assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_lets_in_flight_request_finish() {
    let source = SlowSource::default();
    let origin = Instant::now();

    // Fires while the second request (150s..180s) is in flight
    let sink = Poller::new(source.clone(), RecordingSink::default(), DELAY)
        .run(tokio::time::sleep(Duration::from_secs(160)))
        .await;

    assert_eq!(source.started.lock().unwrap().len(), 2);
    assert_eq!(sink.rendered.len(), 2);
    assert_eq!(
        sink.rendered.last().unwrap().duration_since(origin),
        Duration::from_secs(180)
    );
}

async fn serve(store: MemoryReadingStore) -> String {
    let app = routes::build_router(AppState::new(Arc::new(store), Config::in_memory()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn client_decodes_live_snapshot() {
    let ts = Utc.with_ymd_and_hms(2026, 5, 1, 18, 0, 12).unwrap();
    let store = MemoryReadingStore::with_readings([Reading::at(ts)
        .with_ph(8.04)
        .with_temperature(25.96)
        .with_outlet(3, 1.0)]);

    let base = serve(store).await;
    let client = SnapshotClient::new(&base, Duration::from_secs(5)).unwrap();
    let snapshot: SnapshotResponse = client.fetch_snapshot().await.unwrap();

    assert_eq!(snapshot.latestts, "2026-05-01T18:00:12");
    assert_eq!(snapshot.latestph.as_deref(), Some("8.0"));
    assert_eq!(snapshot.latesttemp.as_deref(), Some("26.0"));
    assert_eq!(snapshot.latest_outlets(), [None, None, Some(1.0), None]);
    assert_eq!(snapshot.phvalues.unwrap().len(), 1);
}

#[tokio::test]
async fn client_reports_empty_store() {
    let base = serve(MemoryReadingStore::new()).await;
    let client = SnapshotClient::new(&base, Duration::from_secs(5)).unwrap();

    assert!(matches!(
        client.fetch_snapshot().await,
        Err(PollError::EmptyStore)
    ));
}

#[tokio::test]
async fn client_reports_transport_failure() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = SnapshotClient::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
    assert!(matches!(
        client.fetch_snapshot().await,
        Err(PollError::Transport(_))
    ));
}
