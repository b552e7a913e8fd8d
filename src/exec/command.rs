// src/exec/command.rs

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

/// Command to run for one changed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryJob {
    /// Position of the entry in the config.
    pub index: usize,
    pub label: String,
    pub primary: String,
    pub cmd: String,
}

/// Run `job.cmd` through the platform shell and wait for it to exit.
///
/// The entry label and primary file are exported as `DIRMON_ENTRY` and
/// `DIRMON_PRIMARY`. Child stdout is logged at info, stderr at debug.
/// Returns the exit code (-1 if killed by a signal).
pub async fn run_job(job: &EntryJob) -> Result<i32> {
    info!(entry = %job.label, index = job.index, cmd = %job.cmd, "running entry command");

    // Build a shell command appropriate for the platform.
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&job.cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(&job.cmd);
        c
    };

    cmd.env("DIRMON_ENTRY", &job.label)
        .env("DIRMON_PRIMARY", &job.primary)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning command for entry '{}'", job.label))?;

    if let Some(stdout) = child.stdout.take() {
        let label = job.label.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(entry = %label, "stdout: {}", line);
            }
        });
    }

    // Always consume stderr so buffers don't fill.
    if let Some(stderr) = child.stderr.take() {
        let label = job.label.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(entry = %label, "stderr: {}", line);
            }
        });
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for command of entry '{}'", job.label))?;

    let code = status.code().unwrap_or(-1);
    info!(
        entry = %job.label,
        exit_code = code,
        success = status.success(),
        "entry command exited"
    );

    Ok(code)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn job(cmd: &str) -> EntryJob {
        EntryJob {
            index: 0,
            label: "dark".to_string(),
            primary: "hss/dark.hss".to_string(),
            cmd: cmd.to_string(),
        }
    }

    #[tokio::test]
    async fn reports_exit_code() {
        assert_eq!(run_job(&job("exit 0")).await.unwrap(), 0);
        assert_eq!(run_job(&job("exit 3")).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn exports_entry_environment() {
        let code = run_job(&job(
            r#"test "$DIRMON_ENTRY" = dark && test "$DIRMON_PRIMARY" = hss/dark.hss"#,
        ))
        .await
        .unwrap();
        assert_eq!(code, 0);
    }
}
