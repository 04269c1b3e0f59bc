//! Background writer for progress snapshots.
//!
//! Handlers hand serialized snapshots to a single worker task so request
//! latency never includes disk writes. Writes for the same key land in the
//! order they were queued; a snapshot identical to the last one written for
//! its key is skipped. The most recent failed write of each key is kept until
//! a later write of that key succeeds, so handlers can report it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use drill_core::ProgressBackend;
use sha2::{Digest, Sha256};
use tokio::sync::{mpsc, oneshot};

enum SaveJob {
    Write { key: String, bytes: Vec<u8> },
    Forget(String),
    Flush(oneshot::Sender<()>),
}

type FailureMap = Arc<Mutex<HashMap<String, String>>>;

/// Handle to the save worker. Cloning shares the same worker.
#[derive(Clone)]
pub struct SaveQueue {
    tx: mpsc::UnboundedSender<SaveJob>,
    failures: FailureMap,
}

impl SaveQueue {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(backend: Arc<dyn ProgressBackend>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let failures = FailureMap::default();
        tokio::spawn(run_worker(backend, rx, Arc::clone(&failures)));
        Self { tx, failures }
    }

    /// Queue a snapshot. Returns `false` when the worker is gone.
    pub fn enqueue(&self, key: String, bytes: Vec<u8>) -> bool {
        self.tx.send(SaveJob::Write { key, bytes }).is_ok()
    }

    /// Reason the last completed write of `key` failed, if it did.
    pub fn last_failure(&self, key: &str) -> Option<String> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Drop everything the worker remembers about `key` once earlier jobs are done.
    pub fn forget(&self, key: String) -> bool {
        self.tx.send(SaveJob::Forget(key)).is_ok()
    }

    /// Wait until everything queued before this call has been handled.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(SaveJob::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

fn record_failure(failures: &FailureMap, key: &str, reason: Option<String>) {
    let mut failures = failures.lock().unwrap_or_else(PoisonError::into_inner);
    match reason {
        Some(reason) => {
            failures.insert(key.to_string(), reason);
        }
        None => {
            failures.remove(key);
        }
    }
}

async fn run_worker(
    backend: Arc<dyn ProgressBackend>,
    mut rx: mpsc::UnboundedReceiver<SaveJob>,
    failures: FailureMap,
) {
    let mut last_written: HashMap<String, [u8; 32]> = HashMap::new();

    while let Some(job) = rx.recv().await {
        match job {
            SaveJob::Write { key, bytes } => {
                let digest: [u8; 32] = Sha256::digest(&bytes).into();
                if last_written.get(&key) == Some(&digest) {
                    tracing::debug!("Snapshot for {} unchanged, skipping write", key);
                    continue;
                }

                let backend = Arc::clone(&backend);
                let write_key = key.clone();
                let result = tokio::task::spawn_blocking(move || backend.put(&write_key, &bytes)).await;

                match result {
                    Ok(Ok(())) => {
                        tracing::debug!("Saved snapshot {}", key);
                        record_failure(&failures, &key, None);
                        last_written.insert(key, digest);
                    }
                    Ok(Err(e)) => {
                        tracing::warn!("Failed to save snapshot {}: {}", key, e);
                        record_failure(&failures, &key, Some(e.to_string()));
                        last_written.remove(&key);
                    }
                    Err(e) => {
                        tracing::error!("Save task for {} did not finish: {}", key, e);
                        record_failure(&failures, &key, Some(e.to_string()));
                        last_written.remove(&key);
                    }
                }
            }
            SaveJob::Forget(key) => {
                record_failure(&failures, &key, None);
                last_written.remove(&key);
            }
            SaveJob::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    tracing::info!("Save queue closed");
}
