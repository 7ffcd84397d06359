// src/pool/worker.rs

//! One build worker: a spawned execution loop owning one pipeline at a time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::warn;

use crate::bridge::{self, LogSink, LogStream};
use crate::config::Timings;
use crate::errors::Result;
use crate::exec::ProcessRunner;
use crate::stage::ToolStage;
use crate::task::{BuildTask, ScriptWriter, ShellFamily, TaskQueue};

/// Observable lifecycle state of a worker.
///
/// `Idle → Building → Idle → … → Closing → Terminated`. A close request
/// received while Building is honoured only after the current pipeline
/// completes; an in-flight external process is never aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Building,
    Closing,
    Terminated,
}

/// Everything the workers share. The queue is internally synchronized; the
/// rest is read-only after startup.
#[derive(Debug)]
pub struct SwarmContext {
    pub queue: TaskQueue,
    pub stage: ToolStage,
    pub shell: ShellFamily,
    pub timings: Timings,
}

/// Pool-side handle to a spawned worker.
#[derive(Debug)]
pub struct WorkerHandle {
    id: u64,
    name: String,
    sink: LogSink,
    close_tx: watch::Sender<bool>,
    state_rx: watch::Receiver<WorkerState>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> WorkerState {
        *self.state_rx.borrow()
    }

    /// Signal the worker to stop accepting tasks. Returns the join handle so
    /// callers that want a fully quiesced shutdown can await the actual
    /// termination, which lags while a build is in flight.
    pub(crate) fn close(self) -> JoinHandle<()> {
        if self.state() == WorkerState::Building {
            self.sink
                .critical("Close request received; it is deferred until the current build finishes.");
        }
        let _ = self.close_tx.send(true);
        self.join
    }
}

pub(crate) struct SpawnedWorker {
    pub handle: WorkerHandle,
    pub logs: LogStream,
    pub started: oneshot::Receiver<()>,
}

/// Spawn a worker loop. `started` fires once the worker has begun polling.
pub(crate) fn spawn(id: u64, ctx: Arc<SwarmContext>) -> SpawnedWorker {
    let name = format!("Worker-{id}");
    let (sink, logs) = bridge::channel(&name);
    let (close_tx, close_rx) = watch::channel(false);
    let (state_tx, state_rx) = watch::channel(WorkerState::Idle);
    let (started_tx, started_rx) = oneshot::channel();

    let join = tokio::spawn(run_loop(
        Arc::clone(&ctx),
        sink.clone(),
        close_rx,
        state_tx,
        started_tx,
    ));

    SpawnedWorker {
        handle: WorkerHandle {
            id,
            name,
            sink,
            close_tx,
            state_rx,
            join,
        },
        logs,
        started: started_rx,
    }
}

async fn run_loop(
    ctx: Arc<SwarmContext>,
    sink: LogSink,
    close_rx: watch::Receiver<bool>,
    state_tx: watch::Sender<WorkerState>,
    started_tx: oneshot::Sender<()>,
) {
    sleep(ctx.timings.startup).await;
    sink.info("Worker has been activated.");

    let mut started = Some(started_tx);
    let mut announced_idle = false;

    while !*close_rx.borrow() {
        if !announced_idle {
            sink.debug("Worker is looking for a task.");
            let _ = state_tx.send(WorkerState::Idle);
            announced_idle = true;
        }
        if let Some(tx) = started.take() {
            let _ = tx.send(());
        }

        let Some(task) = ctx.queue.pop_timeout(ctx.timings.poll).await else {
            continue;
        };
        let _ = state_tx.send(WorkerState::Building);
        announced_idle = false;
        sink.debug(format!("Worker acquired {task} as its build task."));

        let start = Instant::now();
        if let Err(err) = run_pipeline(&ctx, &sink, &task).await {
            sink.error(format!("Build for {task} aborted: {err}"));
            continue;
        }
        sink.info(format!(
            "Worker has finished its build task for {task}. It took {}.",
            format_elapsed(start.elapsed())
        ));
    }

    let _ = state_tx.send(WorkerState::Closing);
    sink.warning("Worker closed; it will not accept further tasks.");
    let _ = state_tx.send(WorkerState::Terminated);

    // Grace period so observers can drain the final records before the sink
    // is released.
    sleep(ctx.timings.grace).await;
}

/// The fixed 4-step pipeline for one dequeued task.
///
/// Directory creation, script write, and unpack failures are fatal to the
/// task and bubble up; a failing external process is reported through the
/// sink and never stops the remaining steps.
async fn run_pipeline(ctx: &SwarmContext, sink: &LogSink, task: &BuildTask) -> Result<()> {
    task.ensure_work_dir()?;

    let writer = ScriptWriter::new(ctx.shell);
    writer.write_scripts(task, ctx.stage.entries())?;
    ctx.stage.unpack_into(task.work_dir())?;
    sink.debug(format!(
        "Worker extracted all tools required and started the build for {task}."
    ));

    let runner = ProcessRunner::new(ctx.shell, ctx.timings.settle);
    if let Err(err) = runner
        .run(&ctx.shell.installer_script(), task.work_dir(), sink)
        .await
    {
        sink.error(format!("Installer step could not run: {err}"));
    }

    sink.debug("Worker finished the build and is now clearing the cache.");
    if let Err(err) = runner
        .run(&ctx.shell.cleanup_script(), task.work_dir(), sink)
        .await
    {
        sink.error(format!("Cleanup step could not run: {err}"));
    }

    if let Err(err) = writer.remove_scripts(task) {
        warn!(task = %task, error = %err, "could not remove generated scripts");
    }
    Ok(())
}

/// `H:MM:SS`, seconds resolution, for the final per-task log line.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}
