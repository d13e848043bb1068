//! Best-effort audit delivery.
//!
//! [`AuditQueue`] is the [`AuditSink`] the engine writes to. It never blocks:
//! when the bounded channel is full or the writer has gone away the record is
//! dropped and counted. [`AuditWriter`] drains the channel on its own task and
//! appends each record to the store's audit log.

use std::sync::{
  Arc,
  atomic::{AtomicU64, Ordering},
};

use matchday_core::{
  audit::{AuditRecord, AuditSink},
  store::MatchdayStore,
};
use tokio::{
  sync::mpsc::{self, error::TrySendError},
  task::JoinHandle,
};
use tracing::{debug, warn};

pub const DEFAULT_CAPACITY: usize = 100;

// ─── Queue ───────────────────────────────────────────────────────────────────

pub struct AuditQueue {
  tx:      mpsc::Sender<AuditRecord>,
  dropped: AtomicU64,
}

impl AuditQueue {
  /// Create a queue holding at most `capacity` pending records, and the
  /// receiving end for an [`AuditWriter`]. A zero capacity is raised to one.
  pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AuditRecord>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let queue = Self {
      tx,
      dropped: AtomicU64::new(0),
    };
    (queue, rx)
  }

  /// Records discarded so far because the queue was full or closed.
  pub fn dropped(&self) -> u64 { self.dropped.load(Ordering::Relaxed) }
}

impl AuditSink for AuditQueue {
  fn enqueue(&self, record: AuditRecord) {
    match self.tx.try_send(record) {
      Ok(()) => {}
      Err(TrySendError::Full(record)) => {
        let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        warn!(
          kind = %record.kind,
          match_key = %record.match_key,
          dropped,
          "audit record dropped: queue full"
        );
      }
      Err(TrySendError::Closed(record)) => {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        // Expected during shutdown.
        debug!(
          kind = %record.kind,
          match_key = %record.match_key,
          "audit record dropped: writer stopped"
        );
      }
    }
  }
}

// ─── Writer ──────────────────────────────────────────────────────────────────

/// Consumes queued records and persists them.
pub struct AuditWriter<S> {
  store: Arc<S>,
  rx:    mpsc::Receiver<AuditRecord>,
}

impl<S> AuditWriter<S>
where
  S: MatchdayStore + 'static,
{
  pub fn new(store: Arc<S>, rx: mpsc::Receiver<AuditRecord>) -> Self { Self { store, rx } }

  /// Run until every [`AuditQueue`] sender has been dropped and the channel
  /// is drained. Store failures are logged and the record is lost.
  pub async fn run(mut self) {
    while let Some(record) = self.rx.recv().await {
      let key = record.match_key.clone();
      if let Err(e) = self.store.append_audit(record).await {
        warn!(match_key = %key, error = %e, "failed to persist audit record");
      }
    }
    debug!("audit writer stopped");
  }

  pub fn spawn(self) -> JoinHandle<()> { tokio::spawn(self.run()) }
}

#[cfg(test)]
mod tests {
  use matchday_core::{
    audit::AuditKind,
    engine::MatchEngine,
    fixture::{EventInput, MatchStatus, NewMatch},
    team::seed_catalog,
  };
  use matchday_store_sqlite::SqliteStore;

  use super::*;

  fn record(key: &str) -> AuditRecord {
    AuditRecord::new(AuditKind::EventAdded, key, "goal by ARS")
  }

  #[tokio::test]
  async fn overflow_drops_without_blocking() {
    let (queue, mut rx) = AuditQueue::channel(2);
    for i in 0..5 {
      queue.enqueue(record(&format!("M{i}")));
    }
    assert_eq!(queue.dropped(), 3);

    // The oldest records are the ones kept.
    assert_eq!(rx.recv().await.unwrap().match_key, "M0");
    assert_eq!(rx.recv().await.unwrap().match_key, "M1");
    assert!(rx.try_recv().is_err());
  }

  #[tokio::test]
  async fn closed_queue_counts_drops() {
    let (queue, rx) = AuditQueue::channel(4);
    drop(rx);
    queue.enqueue(record("M0"));
    assert_eq!(queue.dropped(), 1);
  }

  #[tokio::test]
  async fn zero_capacity_is_usable() {
    let (queue, mut rx) = AuditQueue::channel(0);
    queue.enqueue(record("M0"));
    assert_eq!(rx.recv().await.unwrap().match_key, "M0");
  }

  #[tokio::test]
  async fn saturated_queue_does_not_affect_writes() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    store.seed_teams_if_empty(&seed_catalog()).await.unwrap();
    // No writer: the single slot fills on the first record and stays full.
    let (queue, _rx) = AuditQueue::channel(1);
    let queue = Arc::new(queue);
    let engine = MatchEngine::new(store, queue.clone());

    engine
      .create_match(NewMatch::new("ARS", "LIV", "2026-02-10T18:30:00Z").with_key("ARS-LIV-001"))
      .await
      .unwrap();
    for (team, minute) in [("ARS", 10), ("LIV", 80), ("ARS", 88)] {
      let input = EventInput {
        kind: Some("goal".into()),
        team_code: Some(team.into()),
        minute: Some(minute),
        player: Some("Striker".into()),
        ..Default::default()
      };
      engine.add_event("ARS-LIV-001", input).await.unwrap();
    }
    let m = engine.finalize("ARS-LIV-001").await.unwrap();

    assert_eq!(m.status, MatchStatus::Finished);
    assert_eq!((m.home_goals, m.away_goals), (2, 1));
    assert_eq!(m.events.len(), 3);
    assert_eq!(queue.dropped(), 4);
  }

  #[tokio::test]
  async fn writer_persists_and_stops_when_senders_drop() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let (queue, rx) = AuditQueue::channel(DEFAULT_CAPACITY);
    let writer = AuditWriter::new(store.clone(), rx).spawn();

    queue.enqueue(record("first"));
    queue.enqueue(record("second"));
    drop(queue);
    writer.await.unwrap();

    let stored = store.recent_audit(10).await.unwrap();
    let keys: Vec<&str> = stored.iter().map(|r| r.match_key.as_str()).collect();
    assert_eq!(keys, ["second", "first"]);
  }
}
