//! Background runtime process control

use crate::error::{Error, Result};
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// A runtime process spawned by us.
///
/// The child is spawned with kill-on-drop, so dropping the handle without
/// calling [`ServeProcess::terminate`] still ends the process.
#[derive(Debug)]
pub struct ServeProcess {
    child: Child,
    pid: Option<u32>,
    label: String,
}

impl ServeProcess {
    /// Spawn `command` as a background process
    pub fn spawn(mut command: Command, label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        command.kill_on_drop(true);

        let child = command.spawn().map_err(|e| Error::Command {
            command: label.clone(),
            reason: e.to_string(),
        })?;
        let pid = child.id();

        debug!(command = %label, pid = ?pid, "Spawned background process");

        Ok(Self { child, pid, label })
    }

    /// OS process id, if the process was still alive when spawned
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Exit status if the process has already exited
    pub fn try_exit_status(&mut self) -> Option<ExitStatus> {
        self.child.try_wait().ok().flatten()
    }

    /// Stop the process: SIGTERM, wait up to `grace`, then force-kill.
    pub async fn terminate(&mut self, grace: Duration) -> Result<()> {
        if let Some(status) = self.try_exit_status() {
            debug!(command = %self.label, %status, "Process already exited");
            return Ok(());
        }

        if let Some(pid) = self.pid {
            if let Err(e) = send_sigterm(pid).await {
                warn!(command = %self.label, pid, error = %e, "SIGTERM failed, killing");
                return self.force_kill().await;
            }
        }

        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => {
                info!(command = %self.label, pid = ?self.pid, %status, "Process stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(Error::Io(e)),
            Err(_) => {
                warn!(
                    command = %self.label,
                    grace_secs = grace.as_secs(),
                    "Process ignored SIGTERM, killing"
                );
                self.force_kill().await
            }
        }
    }

    async fn force_kill(&mut self) -> Result<()> {
        self.child.kill().await.map_err(Error::Io)
    }
}

#[cfg(unix)]
async fn send_sigterm(pid: u32) -> Result<()> {
    let status = Command::new("kill")
        .arg("-TERM")
        .arg(pid.to_string())
        .status()
        .await?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::Command {
            command: format!("kill -TERM {}", pid),
            reason: status.to_string(),
        })
    }
}

#[cfg(not(unix))]
async fn send_sigterm(pid: u32) -> Result<()> {
    Err(Error::Command {
        command: format!("kill -TERM {}", pid),
        reason: "signals are not supported on this platform".to_string(),
    })
}

/// Find the PID of a running process by exact name using `pgrep -x`.
pub async fn find_pid(name: &str) -> Option<u32> {
    let output = Command::new("pgrep")
        .arg("-x")
        .arg(name)
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .and_then(|line| line.trim().parse::<u32>().ok())
}
