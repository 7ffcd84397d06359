// src/pool/manager.rs

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::bridge::LogStream;
use crate::errors::{Result, SwarmError};
use crate::pool::worker::{self, SwarmContext, WorkerHandle, WorkerState};

/// The dynamically resizable set of workers.
///
/// Members are ordered by creation; removal is LIFO only. There is no way to
/// target an arbitrary worker, which keeps grow/shrink free of "which worker
/// is free" coordination. Ids increase monotonically and are never reused,
/// so a late worker can never inherit the log identity of a removed one.
pub struct WorkerPool {
    ctx: Arc<SwarmContext>,
    members: Vec<WorkerHandle>,
    next_id: u64,
}

/// What `add` hands back to the caller: the new worker's identity plus the
/// receiving end of its private log bridge.
pub struct WorkerTicket {
    pub id: u64,
    pub name: String,
    pub logs: LogStream,
}

impl WorkerPool {
    pub fn new(ctx: SwarmContext) -> Self {
        Self {
            ctx: Arc::new(ctx),
            members: Vec::new(),
            next_id: 1,
        }
    }

    pub fn context(&self) -> &SwarmContext {
        &self.ctx
    }

    /// Spawn a new worker and register it. Returns once the worker has begun
    /// polling the queue.
    pub async fn add(&mut self) -> WorkerTicket {
        let id = self.next_id;
        self.next_id += 1;

        let spawned = worker::spawn(id, Arc::clone(&self.ctx));
        let name = spawned.handle.name().to_string();
        info!(worker = %name, "adding worker to pool");

        // The worker signals once it enters its poll loop; if it died before
        // that, the closed channel tells us the same thing.
        let _ = spawned.started.await;

        self.members.push(spawned.handle);
        WorkerTicket {
            id,
            name,
            logs: spawned.logs,
        }
    }

    /// Signal Closing to the most recently added worker and drop it from the
    /// bookkeeping immediately. The returned join handle resolves when the
    /// worker actually terminates, which lags while a build is in flight.
    pub fn remove_last(&mut self) -> Result<JoinHandle<()>> {
        let handle = self.members.pop().ok_or(SwarmError::EmptyPool)?;
        debug!(worker = %handle.name(), "removing last worker from pool");
        Ok(handle.close())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// True when every registered worker is between builds.
    pub fn all_idle(&self) -> bool {
        self.members
            .iter()
            .all(|m| m.state() == WorkerState::Idle)
    }
}
