// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{spawn_monitor_loop, LoopOptions, MonitorEvent, Runtime};
use crate::exec::RealExecutorBackend;
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::{collect_directories, Monitor, NotifyNotifier};

pub use crate::types::{CycleOutcome, MonitorOptions};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the blocking monitor loop (on its own thread)
/// - the async runtime that reports changes and runs entry commands
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    if args.dry_run {
        print_dry_run(&cfg, &RealFileSystem, &mut io::stdout().lock())?;
        return Ok(());
    }

    let options = LoopOptions {
        once: args.once,
        timeout: args
            .timeout_ms
            .or(cfg.monitor.timeout_ms)
            .map(Duration::from_millis),
    };

    let notifier = NotifyNotifier::new();
    let interrupter = notifier.interrupter();
    let monitor = Monitor::new(notifier, cfg.monitor_options());

    // Ctrl-C -> wake the blocked wait so the loop can release its handles.
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        info!("Ctrl+C received; shutting down");
        interrupter.interrupt();
    });

    let (tx, rx) = mpsc::channel::<MonitorEvent>(16);
    let monitor_handle = spawn_monitor_loop(monitor, cfg.entry_files(), options, tx);

    let runtime = Runtime::new(cfg.entries.clone(), rx, RealExecutorBackend::new());
    let batches = runtime.run().await?;
    debug!(batches = batches.len(), "runtime finished");

    monitor_handle.await??;
    Ok(())
}

/// Print entries and the directories that would be watched, without watching.
///
/// Slots are counted the way the registry counts them: capacity is checked
/// before subscribing, and a directory that cannot be subscribed to does not
/// take a slot.
fn print_dry_run(cfg: &ConfigFile, fs: &dyn FileSystem, out: &mut impl Write) -> io::Result<()> {
    let options = cfg.monitor_options();

    writeln!(out, "dirmon dry-run")?;
    writeln!(out, "  monitor.capacity = {}", options.capacity)?;
    writeln!(out, "  monitor.max_dir_len = {}", options.max_dir_len)?;
    if let Some(ms) = cfg.monitor.timeout_ms {
        writeln!(out, "  monitor.timeout_ms = {ms}")?;
    }
    writeln!(out)?;

    writeln!(out, "entries ({}):", cfg.entries.len())?;
    for entry in &cfg.entries {
        writeln!(out, "  - {}", entry.label())?;
        for (i, file) in entry.files.iter().enumerate() {
            let role = if i == 0 { "primary" } else { "depends" };
            if file.is_empty() {
                writeln!(out, "      {role}: (empty, skipped)")?;
            } else {
                writeln!(out, "      {role}: {file}")?;
            }
        }
        if let Some(ref cmd) = entry.cmd {
            writeln!(out, "      cmd: {cmd}")?;
        }
    }
    writeln!(out)?;

    let dirs = collect_directories(&cfg.entry_files(), options.max_dir_len);
    writeln!(out, "directories ({}):", dirs.len())?;
    let mut slots = 0;
    for dir in &dirs {
        let mut notes = Vec::new();
        let exists = fs.is_dir(Path::new(dir));
        if slots >= options.capacity {
            notes.push("over capacity");
        } else if exists {
            slots += 1;
        }
        if !exists {
            notes.push("missing");
        }
        if notes.is_empty() {
            writeln!(out, "  - {dir}")?;
        } else {
            writeln!(out, "  - {dir} ({})", notes.join(", "))?;
        }
    }
    out.flush()?;

    debug!(watched = slots, "dry-run complete (nothing watched)");
    Ok(())
}
