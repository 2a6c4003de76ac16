//! MungeFailDB Sink (§6 supplement).
//!
//! Optional SQLite sink of rejected candidates, enabled by
//! `-CreateMungeFailDB`. Writes are batched on a dedicated thread so the
//! hot search loop never blocks on disk I/O; the thread drains an unbounded
//! channel and commits in chunks. Built without the `sqlite-fail-db`
//! feature, [`FailDbSink::open`] returns a sink that silently drops every
//! record instead of touching the filesystem.

use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

use crate::registry::TransformRegistry;
use crate::sequence::{Sequence, SerializeOptions};

const BATCH_LIMIT: usize = 256;

struct FailedCandidate {
    sequence_text: String,
    reason: String,
}

/// Batched sink for rejected candidates. Dropping the sink closes the
/// channel and joins the writer thread, flushing anything still queued.
pub struct FailDbSink {
    sender: Option<Sender<FailedCandidate>>,
    worker: Option<JoinHandle<()>>,
}

impl FailDbSink {
    /// Open (creating if absent) a `MungeFailDB,-*.db` at `path` and spawn
    /// its writer thread.
    #[must_use]
    pub fn open(path: &std::path::Path) -> Self {
        #[cfg(feature = "sqlite-fail-db")]
        {
            Self::open_sqlite(path)
        }
        #[cfg(not(feature = "sqlite-fail-db"))]
        {
            let _ = path;
            Self { sender: None, worker: None }
        }
    }

    /// A sink that drops every record, for callers that did not pass
    /// `-CreateMungeFailDB`.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { sender: None, worker: None }
    }

    #[cfg(feature = "sqlite-fail-db")]
    fn open_sqlite(path: &std::path::Path) -> Self {
        let (sender, receiver) = mpsc::channel::<FailedCandidate>();
        let path = path.to_owned();
        let worker = std::thread::spawn(move || run_writer(&path, &receiver));
        Self { sender: Some(sender), worker: Some(worker) }
    }

    /// Queue a rejected candidate for persistence. Never blocks on I/O; a
    /// disabled or dead sink silently drops the record.
    pub fn record(&self, sequence: &Sequence, registry: &TransformRegistry, reason: impl Into<String>) {
        let Some(sender) = &self.sender else { return };
        let sequence_text = sequence.serialize(SerializeOptions::full(), registry);
        let _ = sender.send(FailedCandidate { sequence_text, reason: reason.into() });
    }
}

impl Drop for FailDbSink {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(feature = "sqlite-fail-db")]
fn run_writer(path: &std::path::Path, receiver: &mpsc::Receiver<FailedCandidate>) {
    let conn = match rusqlite::Connection::open(path) {
        Ok(conn) => conn,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "MungeFailDB: failed to open, dropping writer thread");
            return;
        }
    };
    if let Err(e) = conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS failures (
            id INTEGER PRIMARY KEY,
            sequence_text TEXT NOT NULL,
            reason TEXT NOT NULL,
            recorded_at_unix_ms INTEGER NOT NULL
        );",
    ) {
        tracing::warn!(error = %e, "MungeFailDB: failed to create schema");
        return;
    }

    while let Some(batch) = next_batch(receiver) {
        if conn.execute_batch("BEGIN;").is_err() {
            continue;
        }
        for candidate in &batch {
            let now_ms = now_unix_ms();
            let _ = conn.execute(
                "INSERT INTO failures (sequence_text, reason, recorded_at_unix_ms) VALUES (?1, ?2, ?3)",
                rusqlite::params![candidate.sequence_text, candidate.reason, now_ms],
            );
        }
        let _ = conn.execute_batch("COMMIT;");
    }
}

#[cfg(feature = "sqlite-fail-db")]
fn now_unix_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

#[cfg(feature = "sqlite-fail-db")]
fn next_batch(receiver: &mpsc::Receiver<FailedCandidate>) -> Option<Vec<FailedCandidate>> {
    let first = receiver.recv().ok()?;
    let mut batch = vec![first];
    while batch.len() < BATCH_LIMIT {
        match receiver.try_recv() {
            Ok(item) => batch.push(item),
            Err(_) => break,
        }
    }
    Some(batch)
}

#[cfg(all(test, feature = "sqlite-fail-db"))]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn records_persist_to_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MungeFailDB,-L1-P1-DN-MN-SP.db");
        let registry = TransformRegistry::bootstrap();
        let sequence = Sequence::new(vec![(1, 1)], 1).unwrap();

        {
            let sink = FailDbSink::open(&path);
            sink.record(&sequence, &registry, "below pass_count");
        }

        let conn = rusqlite::Connection::open(&path).unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM failures", [], |row| row.get(0)).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn disabled_sink_never_touches_disk() {
        let registry = TransformRegistry::bootstrap();
        let sequence = Sequence::new(vec![(1, 1)], 1).unwrap();
        let sink = FailDbSink::disabled();
        sink.record(&sequence, &registry, "unused");
    }
}
