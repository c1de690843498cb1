// Signal-based process manager (TTIN/TTOU/HUP master control)
// reason: nix for POSIX signals
use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid as NixPid;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use poolwarden_core::application::supervisor::constants::{
    DEFAULT_TERMINATE_GRACE, SIGNAL_SPACING, TERMINATE_POLL_INTERVAL,
};
use poolwarden_core::domain::Pid;
use poolwarden_core::port::{MasterTerminator, ProcessManager, ProcessManagerError, ProcessTable};

/// Convert a PID without ever producing a negative (process group) target
fn nix_pid(pid: Pid) -> Result<NixPid, ProcessManagerError> {
    i32::try_from(pid)
        .ok()
        .filter(|raw| *raw > 0)
        .map(NixPid::from_raw)
        .ok_or_else(|| ProcessManagerError::Signal {
            pid,
            signal: "-".to_string(),
            reason: "pid out of range".to_string(),
        })
}

/// Drives the master through its signal interface
///
/// - `SIGTTIN`: one more worker
/// - `SIGTTOU`: one fewer worker, the master retires its oldest
/// - `SIGHUP`: graceful reload of every worker
pub struct SignalProcessManager {
    master: Pid,
    spacing: Duration,
}

impl SignalProcessManager {
    pub fn new(master: Pid) -> Self {
        Self::with_spacing(master, SIGNAL_SPACING)
    }

    /// Custom pause between repeated signals
    pub fn with_spacing(master: Pid, spacing: Duration) -> Self {
        Self { master, spacing }
    }

    fn send(&self, signal: Signal) -> Result<(), ProcessManagerError> {
        let pid = nix_pid(self.master)?;
        kill(pid, signal).map_err(|e| ProcessManagerError::Signal {
            pid: self.master,
            signal: signal.as_str().to_string(),
            reason: e.to_string(),
        })
    }

    async fn send_repeated(
        &self,
        signal: Signal,
        count: usize,
    ) -> Result<(), ProcessManagerError> {
        for i in 0..count {
            // Identical pending signals coalesce into one
            if i > 0 {
                sleep(self.spacing).await;
            }
            self.send(signal)?;
        }
        debug!(master_pid = self.master, signal = signal.as_str(), count, "Signals sent");
        Ok(())
    }
}

#[async_trait]
impl ProcessManager for SignalProcessManager {
    async fn spawn_workers(&self, count: usize) -> Result<(), ProcessManagerError> {
        self.send_repeated(Signal::SIGTTIN, count).await
    }

    async fn kill_oldest_workers(&self, count: usize) -> Result<(), ProcessManagerError> {
        self.send_repeated(Signal::SIGTTOU, count).await
    }

    async fn reload_master(&self) -> Result<(), ProcessManagerError> {
        info!(master_pid = self.master, "Sending SIGHUP for graceful reload");
        self.send(Signal::SIGHUP)
    }
}

/// Tears the master tree down: SIGTERM first, SIGKILL after a grace period
///
/// On escalation the master's children are killed too, since a SIGKILLed
/// master cannot reap or stop its workers.
pub struct SignalMasterTerminator {
    table: Arc<dyn ProcessTable>,
    grace: Duration,
    poll_interval: Duration,
}

impl SignalMasterTerminator {
    pub fn new(table: Arc<dyn ProcessTable>) -> Self {
        Self::with_grace(table, DEFAULT_TERMINATE_GRACE)
    }

    pub fn with_grace(table: Arc<dyn ProcessTable>, grace: Duration) -> Self {
        Self {
            table,
            grace,
            poll_interval: TERMINATE_POLL_INTERVAL.min(grace),
        }
    }

    fn force_kill(&self, master: Pid, pid: NixPid) -> Result<(), ProcessManagerError> {
        let children = self.table.children(master);
        warn!(
            master_pid = master,
            children = children.len(),
            "Master did not exit after SIGTERM, sending SIGKILL"
        );

        match kill(pid, Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(e) => {
                return Err(ProcessManagerError::Terminate(format!(
                    "SIGKILL failed: {}",
                    e
                )))
            }
        }
        for child in children {
            if let Ok(child_pid) = nix_pid(child) {
                // Already gone is fine
                let _ = kill(child_pid, Signal::SIGKILL);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MasterTerminator for SignalMasterTerminator {
    async fn terminate_tree(&self, master: Pid) -> Result<(), ProcessManagerError> {
        let pid = nix_pid(master)?;

        info!(master_pid = master, "Sending SIGTERM to master");
        match kill(pid, Signal::SIGTERM) {
            Ok(()) => {}
            Err(Errno::ESRCH) => {
                info!(master_pid = master, "Master already exited");
                return Ok(());
            }
            Err(e) => {
                return Err(ProcessManagerError::Terminate(format!(
                    "SIGTERM failed: {}",
                    e
                )))
            }
        }

        let deadline = Instant::now() + self.grace;
        loop {
            sleep(self.poll_interval).await;

            // Signal 0 only checks existence
            if kill(pid, None).is_err() {
                info!(master_pid = master, "Master exited after SIGTERM");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return self.force_kill(master, pid);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SysinfoProcessTable;
    use std::os::unix::process::ExitStatusExt;
    use std::process::{Command, Stdio};

    fn sleeper() -> std::process::Child {
        Command::new("sleep")
            .arg("30")
            .stdout(Stdio::null())
            .spawn()
            .unwrap()
    }

    fn reaped_pid() -> Pid {
        let mut child = Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();
        pid
    }

    #[tokio::test]
    async fn test_reload_sends_sighup() {
        let mut child = sleeper();
        let manager = SignalProcessManager::new(child.id());

        manager.reload_master().await.unwrap();

        let status = child.wait().unwrap();
        assert_eq!(status.signal(), Some(Signal::SIGHUP as i32));
    }

    #[tokio::test]
    async fn test_signal_to_dead_master_fails() {
        let manager = SignalProcessManager::with_spacing(reaped_pid(), Duration::ZERO);

        let err = manager.spawn_workers(2).await.unwrap_err();
        assert!(matches!(
            err,
            ProcessManagerError::Signal { ref signal, .. } if signal == "SIGTTIN"
        ));
        assert!(manager.kill_oldest_workers(1).await.is_err());
    }

    #[tokio::test]
    async fn test_zero_count_sends_nothing() {
        let manager = SignalProcessManager::new(reaped_pid());

        assert!(manager.spawn_workers(0).await.is_ok());
        assert!(manager.kill_oldest_workers(0).await.is_ok());
    }

    #[test]
    fn test_pid_out_of_range_rejected() {
        assert!(nix_pid(0).is_err());
        assert!(nix_pid(u32::MAX).is_err());
        assert_eq!(nix_pid(42).unwrap(), NixPid::from_raw(42));
    }

    #[tokio::test]
    async fn test_terminate_sends_sigterm_first() {
        let mut child = sleeper();
        let terminator = SignalMasterTerminator::with_grace(
            Arc::new(SysinfoProcessTable::new()),
            Duration::from_millis(200),
        );

        terminator.terminate_tree(child.id()).await.unwrap();

        let status = child.wait().unwrap();
        assert_eq!(status.signal(), Some(Signal::SIGTERM as i32));
    }

    #[tokio::test]
    async fn test_terminate_escalates_to_sigkill() {
        let mut child = Command::new("sh")
            .args(["-c", "trap '' TERM; sleep 30"])
            .spawn()
            .unwrap();
        // Let the shell install its trap
        sleep(Duration::from_millis(200)).await;
        let terminator = SignalMasterTerminator::with_grace(
            Arc::new(SysinfoProcessTable::new()),
            Duration::from_millis(300),
        );

        terminator.terminate_tree(child.id()).await.unwrap();

        let status = child.wait().unwrap();
        assert_eq!(status.signal(), Some(Signal::SIGKILL as i32));
    }

    #[tokio::test]
    async fn test_terminate_already_exited_master() {
        let terminator = SignalMasterTerminator::with_grace(
            Arc::new(SysinfoProcessTable::new()),
            Duration::from_millis(100),
        );

        assert!(terminator.terminate_tree(reaped_pid()).await.is_ok());
    }
}
