#![cfg(unix)]

use std::error::Error;
use std::fs;
use std::time::Duration;

use tempfile::tempdir;
use tokio::sync::mpsc;
use tokio::time::timeout;

use buildswarm::bridge::{LogLevel, LogRecord};
use buildswarm::config::Timings;
use buildswarm::errors::SwarmError;
use buildswarm::pool::{SwarmContext, WorkerPool, WorkerTicket};
use buildswarm::stage::ToolStage;
use buildswarm::task::{BuildTask, ShellFamily, TaskQueue};

type TestResult = Result<(), Box<dyn Error>>;

fn fast_timings() -> Timings {
    Timings {
        startup: Duration::from_millis(10),
        poll: Duration::from_millis(40),
        settle: Duration::from_millis(50),
        grace: Duration::from_millis(20),
    }
}

fn forward_logs(ticket: WorkerTicket, out: mpsc::UnboundedSender<(String, LogRecord)>) {
    tokio::spawn(async move {
        let mut logs = ticket.logs;
        while let Some(record) = logs.recv().await {
            let _ = out.send((ticket.name.clone(), record));
        }
    });
}

#[tokio::test]
async fn two_workers_build_two_versions_to_completion() -> TestResult {
    let tmp = tempdir()?;

    // Stage: the installer jar plus a data directory, as the real tool ships.
    let tools_dir = tmp.path().join("tools");
    fs::create_dir_all(tools_dir.join("BuildData"))?;
    fs::write(tools_dir.join("BuildData").join("info.json"), "{}")?;
    fs::write(tools_dir.join("BuildTools.jar"), "jar bytes")?;

    let queue = TaskQueue::new();
    let mut pool = WorkerPool::new(SwarmContext {
        queue: queue.clone(),
        stage: ToolStage::load(&tools_dir)?,
        shell: ShellFamily::posix(),
        timings: fast_timings(),
    });

    let (records_tx, mut records_rx) = mpsc::unbounded_channel();
    for _ in 0..2 {
        forward_logs(pool.add().await, records_tx.clone());
    }

    let build_root = tmp.path().join("build");
    let mut work_dirs = Vec::new();
    for (version, optional) in [("1.16.5", true), ("1.12.2", false)] {
        let mut task = BuildTask::new(version, &build_root)?;
        task.request_optional_step(optional);
        work_dirs.push(task.work_dir().to_path_buf());
        queue.enqueue(task);
    }

    // Collect records until both final per-task lines have arrived.
    let mut finished = Vec::new();
    while finished.len() < 2 {
        let (_, record) = timeout(Duration::from_secs(10), records_rx.recv())
            .await?
            .expect("log stream stays open while workers are registered");
        if record.level == LogLevel::Info && record.message.contains("has finished its build task")
        {
            finished.push(record);
        }
    }

    for record in &finished {
        assert!(record.message.contains("It took "), "{}", record.message);
    }
    let messages: String = finished.iter().map(|r| r.message.as_str()).collect();
    assert!(messages.contains("1.16.5"));
    assert!(messages.contains("1.12.2"));

    // Both work dirs exist and neither still carries the generated scripts.
    for work_dir in &work_dirs {
        assert!(work_dir.is_dir());
        assert!(!work_dir.join("installer.sh").exists());
        assert!(!work_dir.join("cleanup.sh").exists());
    }

    // LIFO shutdown drains the pool; one more removal is a typed error.
    let second = pool.remove_last()?;
    let first = pool.remove_last()?;
    match pool.remove_last() {
        Err(SwarmError::EmptyPool) => {}
        other => panic!("expected EmptyPool, got {other:?}"),
    }
    second.await?;
    first.await?;

    Ok(())
}
