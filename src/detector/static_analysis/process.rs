//! Process-group cleanup for the external engine
//!
//! Engines like Semgrep fork helpers (`semgrep-core`). `kill_on_drop` only
//! reaches the direct child, so the engine runs in its own process group and
//! the whole group is killed when the guard is dropped unfinished.

use tokio::process::Command;

/// Put the spawned engine at the head of a fresh process group
pub(crate) fn isolate_group(command: &mut Command) {
    #[cfg(unix)]
    command.process_group(0);

    #[cfg(not(unix))]
    let _ = command;
}

/// Kills the engine's process group on drop unless released first
pub(crate) struct ProcessGroupGuard {
    pgid: Option<u32>,
}

impl ProcessGroupGuard {
    /// Guard the group led by `pid` (the child's pid, see [`isolate_group`])
    pub(crate) fn new(pid: Option<u32>) -> Self {
        Self { pgid: pid }
    }

    /// The engine exited on its own; leave the group alone
    pub(crate) fn release(mut self) {
        self.pgid = None;
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_group(pgid);
        }
    }
}

#[cfg(unix)]
fn kill_group(pgid: u32) {
    let Ok(pgid) = i32::try_from(pgid) else {
        return;
    };
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc == 0 {
        tracing::debug!(pgid, "killed engine process group");
    } else {
        let error = std::io::Error::last_os_error();
        tracing::debug!(pgid, error = %error, "engine process group already gone");
    }
}

#[cfg(not(unix))]
fn kill_group(_pgid: u32) {}
