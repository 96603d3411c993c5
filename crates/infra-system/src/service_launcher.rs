// Service manager launcher
// reason: tokio::process so the dropped child is reaped without a wait() here
use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

use kvmd_core::port::process_launcher::{LaunchError, ProcessLauncher};

/// Default hand-off to the system service manager
pub const DEFAULT_UPDATE_COMMAND: &str = "sudo /usr/sbin/service kvmd-updater start";

/// Environment variables passed through to the launch command
pub const DEFAULT_ENV_ALLOWLIST: &[&str] = &["PATH", "LANG", "LC_ALL"];

/// Starts the updater through the service manager, fire-and-forget
///
/// The service manager, not this server, becomes the updater's parent, so
/// the update survives a server restart or crash. The command's output is
/// not parsed; success means the spawn was accepted.
pub struct ServiceLauncher {
    program: String,
    args: Vec<String>,
    env_allowlist: Vec<String>,
}

impl ServiceLauncher {
    /// Create a launcher for an explicit program and arguments
    ///
    /// # Example
    /// ```ignore
    /// let launcher = ServiceLauncher::new(
    ///     "sudo",
    ///     vec!["/usr/sbin/service".to_string(), "kvmd-updater".to_string(), "start".to_string()],
    /// );
    /// ```
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            env_allowlist: DEFAULT_ENV_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Parse a whitespace-separated command line
    pub fn from_command_line(line: &str) -> Result<Self, LaunchError> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| LaunchError::InvalidCommand("empty command line".to_string()))?;
        Ok(Self::new(program, parts.collect()))
    }

    pub fn with_env_allowlist(mut self, env_allowlist: Vec<String>) -> Self {
        self.env_allowlist = env_allowlist;
        self
    }

    /// Filter environment variables to allowlist only
    fn filter_env(&self, env: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
        env.filter(|(k, _)| self.env_allowlist.contains(k)).collect()
    }

    fn build_command(&self) -> Command {
        let mut std_command = std::process::Command::new(&self.program);
        std_command
            .args(&self.args)
            .env_clear()
            .envs(self.filter_env(std::env::vars()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Own process group: a Ctrl+C aimed at the server must not reach it
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            std_command.process_group(0);
        }

        let mut command = Command::from(std_command);
        command.kill_on_drop(false);
        command
    }
}

#[async_trait]
impl ProcessLauncher for ServiceLauncher {
    async fn spawn_detached(&self) -> Result<(), LaunchError> {
        let child = self
            .build_command()
            .spawn()
            .map_err(|e| LaunchError::SpawnFailed(format!("{}: {}", self.program, e)))?;

        info!(
            program = %self.program,
            args = ?self.args,
            pid = ?child.id(),
            "Update launch command spawned"
        );

        // No handle kept; tokio reaps the exit status in the background
        drop(child);
        Ok(())
    }
}
