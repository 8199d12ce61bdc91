//! Background write-back of progress snapshots.
//!
//! The interactive path only ever enqueues; one worker task drains the queue
//! in FIFO order and commits each snapshot to the durable store. A failed
//! commit is logged and dropped, never retried.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use quiz_core::model::QuizId;
use storage::repository::ProgressRepository;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A serialized snapshot waiting for its durable commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub quiz_id: QuizId,
    pub content: Vec<u8>,
}

impl PendingWrite {
    #[must_use]
    pub fn new(quiz_id: QuizId, content: Vec<u8>) -> Self {
        Self { quiz_id, content }
    }

    /// Name of the durable record this write replaces.
    #[must_use]
    pub fn destination(&self) -> String {
        self.quiz_id.progress_file_name()
    }
}

/// Counters describing the worker's activity so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    pub committed: u64,
    pub failed: u64,
    pub pending: usize,
}

#[derive(Debug, Default)]
struct Counters {
    committed: AtomicU64,
    failed: AtomicU64,
    pending: AtomicUsize,
}

enum Job {
    Write(PendingWrite),
    Barrier(oneshot::Sender<()>),
    Shutdown,
}

/// Cheap, cloneable producer side of the queue.
#[derive(Clone)]
pub struct DispatcherHandle {
    tx: mpsc::UnboundedSender<Job>,
    counters: Arc<Counters>,
}

impl DispatcherHandle {
    /// Queue a snapshot for commit. Never blocks.
    ///
    /// Returns `false` if the worker has already stopped; the write is dropped.
    pub fn enqueue(&self, write: PendingWrite) -> bool {
        let destination = write.destination();
        self.counters.pending.fetch_add(1, Ordering::AcqRel);
        if self.tx.send(Job::Write(write)).is_err() {
            self.counters.pending.fetch_sub(1, Ordering::AcqRel);
            warn!(%destination, "persistence worker stopped; dropping write");
            return false;
        }
        debug!(%destination, "progress snapshot enqueued");
        true
    }

    /// Wait until every write enqueued before this call has been attempted.
    pub async fn drain(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Job::Barrier(ack)).is_err() {
            return;
        }
        let _ = done.await;
    }

    /// Block the calling thread until queued writes are attempted or
    /// `timeout` passes. Returns whether the queue drained in time.
    ///
    /// The wait runs on a helper thread driven by `runtime`, so the caller may
    /// sit inside another runtime's context.
    pub fn drain_blocking(&self, runtime: &Handle, timeout: Duration) -> bool {
        let runtime = runtime.clone();
        let handle = self.clone();
        let waiter = thread::spawn(move || {
            runtime.block_on(async { tokio::time::timeout(timeout, handle.drain()).await.is_ok() })
        });
        waiter.join().unwrap_or(false)
    }

    #[must_use]
    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            committed: self.counters.committed.load(Ordering::Acquire),
            failed: self.counters.failed.load(Ordering::Acquire),
            pending: self.counters.pending.load(Ordering::Acquire),
        }
    }
}

/// Owns the single worker task draining the pending-write queue.
pub struct PersistenceDispatcher {
    handle: DispatcherHandle,
    worker: JoinHandle<()>,
}

impl PersistenceDispatcher {
    /// Start the worker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(store: Arc<dyn ProgressRepository>) -> Self {
        Self::spawn_on(&Handle::current(), store)
    }

    /// Start the worker on `runtime`.
    #[must_use]
    pub fn spawn_on(runtime: &Handle, store: Arc<dyn ProgressRepository>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());
        let worker = runtime.spawn(run_worker(store, rx, Arc::clone(&counters)));
        Self {
            handle: DispatcherHandle { tx, counters },
            worker,
        }
    }

    #[must_use]
    pub fn handle(&self) -> DispatcherHandle {
        self.handle.clone()
    }

    /// Commit everything already queued, then stop the worker.
    pub async fn shutdown(self) -> DispatcherStats {
        let _ = self.handle.tx.send(Job::Shutdown);
        if let Err(err) = self.worker.await {
            warn!(error = %err, "persistence worker ended abnormally");
        }
        self.handle.stats()
    }
}

async fn run_worker(
    store: Arc<dyn ProgressRepository>,
    mut rx: mpsc::UnboundedReceiver<Job>,
    counters: Arc<Counters>,
) {
    while let Some(job) = rx.recv().await {
        match job {
            Job::Write(write) => {
                commit(store.as_ref(), &write, &counters).await;
                counters.pending.fetch_sub(1, Ordering::AcqRel);
            }
            Job::Barrier(ack) => {
                let _ = ack.send(());
            }
            Job::Shutdown => break,
        }
    }
    debug!("persistence worker stopped");
}

async fn commit(store: &dyn ProgressRepository, write: &PendingWrite, counters: &Counters) {
    match store.write_snapshot(&write.quiz_id, &write.content).await {
        Ok(()) => {
            counters.committed.fetch_add(1, Ordering::AcqRel);
            debug!(destination = %write.destination(), bytes = write.content.len(), "progress committed");
        }
        Err(err) => {
            counters.failed.fetch_add(1, Ordering::AcqRel);
            warn!(destination = %write.destination(), error = %err, "progress commit failed; dropping snapshot");
        }
    }
}
