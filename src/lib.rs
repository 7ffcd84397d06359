// src/lib.rs

pub mod bridge;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod pool;
pub mod stage;
pub mod task;

use std::path::PathBuf;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::errors::{Result, SwarmError};
use crate::pool::{SwarmContext, WorkerPool, WorkerTicket};
use crate::stage::ToolStage;
use crate::task::{BuildTask, ShellFamily, TaskQueue};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (plus CLI overrides)
/// - shell family + tool stage resolution (once, at startup)
/// - worker pool with one console observer per worker
/// - task submission
/// - quiescence wait and LIFO shutdown
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    let (versions, craftbukkit) = if args.rev.is_empty() {
        (cfg.build.versions.clone(), cfg.build.craftbukkit.clone())
    } else {
        (args.rev.clone(), args.craftbukkit.clone())
    };
    if versions.is_empty() {
        return Err(SwarmError::Config(
            "no versions to build; set [build].versions or pass --rev".to_string(),
        ));
    }
    let worker_count = args.workers.unwrap_or(cfg.build.starting_workers).max(1);

    let shell = ShellFamily::native();
    let build_root = PathBuf::from(&cfg.build.build_root);

    if args.dry_run {
        print_dry_run(&versions, &craftbukkit, worker_count, &cfg, &shell);
        return Ok(());
    }

    let stage = ToolStage::load(&cfg.build.tools_dir)?;
    let queue = TaskQueue::new();
    let mut pool = WorkerPool::new(SwarmContext {
        queue: queue.clone(),
        stage,
        shell,
        timings: cfg.timing.to_timings(),
    });

    let mut observers = Vec::new();
    for _ in 0..worker_count {
        let ticket = pool.add().await;
        observers.push(spawn_console_observer(ticket));
    }

    for version in &versions {
        let mut task = BuildTask::new(version, &build_root)?;
        task.request_optional_step(craftbukkit.contains(version));
        queue.enqueue(task);
    }
    info!(
        queued = versions.len(),
        workers = worker_count,
        "all build tasks enqueued"
    );

    wait_until_quiet(&queue, &pool).await;

    // LIFO shutdown: repeatedly remove the newest worker, then wait for the
    // stragglers (a worker mid-build finishes its pipeline first).
    let mut joins = Vec::new();
    while !pool.is_empty() {
        joins.push(pool.remove_last()?);
    }
    for join in joins {
        let _ = join.await;
    }
    for observer in observers {
        let _ = observer.await;
    }

    info!("all workers terminated");
    Ok(())
}

/// Print one worker's log records to stdout as they arrive.
fn spawn_console_observer(ticket: WorkerTicket) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut logs = ticket.logs;
        while let Some(record) = logs.recv().await {
            println!("[{}] [{}] {record}", ticket.name, record.level);
        }
    })
}

/// Wait until the queue is drained and every worker is between builds, or
/// until Ctrl-C. The condition must hold across two consecutive checks to
/// cover the instant between a dequeue and the worker marking itself
/// Building.
async fn wait_until_quiet(queue: &TaskQueue, pool: &WorkerPool) {
    let mut quiet_checks = 0u32;
    loop {
        tokio::select! {
            _ = sleep(Duration::from_millis(250)) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received; shutting the pool down");
                return;
            }
        }

        if queue.is_empty() && pool.all_idle() {
            quiet_checks += 1;
            if quiet_checks >= 2 {
                return;
            }
        } else {
            quiet_checks = 0;
        }
    }
}

/// Simple dry-run output: print the plan without touching the filesystem.
fn print_dry_run(
    versions: &[String],
    craftbukkit: &[String],
    worker_count: usize,
    cfg: &config::ConfigFile,
    shell: &ShellFamily,
) {
    println!("buildswarm dry-run");
    println!("  workers: {worker_count}");
    println!("  build_root: {}", cfg.build.build_root);
    println!("  tools_dir: {}", cfg.build.tools_dir);
    println!("  script family: .{}", shell.script_ext);
    println!();

    println!("versions ({}):", versions.len());
    for version in versions {
        let extra = craftbukkit.contains(version);
        match task::minor_component(version) {
            Ok(minor) if extra && minor > task::CRAFTBUKKIT_MIN_MINOR => {
                println!("  - {version} (+ craftbukkit compile)");
            }
            Ok(_) if extra => {
                println!("  - {version} (craftbukkit requested but below minor threshold)");
            }
            Ok(_) => println!("  - {version}"),
            Err(_) => println!("  - {version} (INVALID identifier)"),
        }
    }
}
