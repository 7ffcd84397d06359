// src/task/queue.rs

//! Shared FIFO handoff between the producer and the workers.
//!
//! Enqueueing never blocks; dequeueing is bounded by a timeout so workers
//! can keep checking for close requests. FIFO order across producers is
//! guaranteed by the underlying channel; workers compete for the receiver.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::time::timeout;
use tracing::warn;

use crate::task::build_task::BuildTask;

#[derive(Debug, Clone)]
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<BuildTask>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<BuildTask>>>,
    depth: Arc<AtomicUsize>,
}

impl TaskQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
            depth: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Push one task. Never blocks the caller.
    pub fn enqueue(&self, task: BuildTask) {
        self.depth.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(task).is_err() {
            // Cannot happen while any queue handle is alive; the receiver is
            // kept inside the queue itself.
            self.depth.fetch_sub(1, Ordering::SeqCst);
            warn!("task queue receiver gone; dropping enqueued task");
        }
    }

    /// Wait up to `wait` for the next task. Returns `None` on timeout.
    pub async fn pop_timeout(&self, wait: Duration) -> Option<BuildTask> {
        let recv = async {
            let mut rx = self.rx.lock().await;
            rx.recv().await
        };
        match timeout(wait, recv).await {
            Ok(Some(task)) => {
                self.depth.fetch_sub(1, Ordering::SeqCst);
                Some(task)
            }
            _ => None,
        }
    }

    /// Number of tasks not yet handed to a worker.
    pub fn pending(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}
