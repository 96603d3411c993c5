//! Daemon configuration
//!
//! Read once from the environment at startup. Paths go through `~` expansion.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use kvmd_infra_system::service_launcher::DEFAULT_UPDATE_COMMAND;

const DEFAULT_LOG_DIR: &str = "~/logs";
const DEFAULT_STATE_DIR: &str = "~/.kvmd";
const DEFAULT_UPDATE_SCRIPT: &str = "/opt/kvmd-updater/scripts/update";
const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9527;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Directory holding update result files
    pub log_dir: PathBuf,
    /// Directory holding the launch lock
    pub state_dir: PathBuf,
    /// Absolute path the liveness probe looks for
    pub update_script: PathBuf,
    /// Service manager command that starts the updater
    pub update_command: String,
    /// Legacy results older than this are ignored (None = no window)
    pub result_max_age: Option<Duration>,
    pub rpc_host: String,
    pub rpc_port: u16,
}

impl DaemonConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup (tests pass a map)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let path = |key: &str, default: &str| -> PathBuf {
            let raw = lookup(key).unwrap_or_else(|| default.to_string());
            PathBuf::from(shellexpand::tilde(&raw).into_owned())
        };

        let result_max_age = lookup("KVMD_RESULT_MAX_AGE_SECS")
            .map(|raw| {
                raw.parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| format!("KVMD_RESULT_MAX_AGE_SECS is not a number: {raw:?}"))
            })
            .transpose()?;

        let rpc_port = lookup("KVMD_RPC_PORT")
            .map(|raw| {
                raw.parse::<u16>()
                    .with_context(|| format!("KVMD_RPC_PORT is not a port: {raw:?}"))
            })
            .transpose()?
            .unwrap_or(DEFAULT_RPC_PORT);

        Ok(Self {
            log_dir: path("KVMD_LOG_DIR", DEFAULT_LOG_DIR),
            state_dir: path("KVMD_STATE_DIR", DEFAULT_STATE_DIR),
            update_script: path("KVMD_UPDATE_SCRIPT", DEFAULT_UPDATE_SCRIPT),
            update_command: lookup("KVMD_UPDATE_COMMAND")
                .unwrap_or_else(|| DEFAULT_UPDATE_COMMAND.to_string()),
            result_max_age,
            rpc_host: lookup("KVMD_RPC_HOST").unwrap_or_else(|| DEFAULT_RPC_HOST.to_string()),
            rpc_port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<DaemonConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DaemonConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.update_script, PathBuf::from(DEFAULT_UPDATE_SCRIPT));
        assert_eq!(config.update_command, DEFAULT_UPDATE_COMMAND);
        assert_eq!(config.result_max_age, None);
        assert_eq!(config.rpc_port, 9527);
        assert_eq!(config.rpc_host, "127.0.0.1");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("KVMD_LOG_DIR", "/var/log/kvmd"),
            ("KVMD_RESULT_MAX_AGE_SECS", "480"),
            ("KVMD_RPC_PORT", "8000"),
        ])
        .unwrap();
        assert_eq!(config.log_dir, PathBuf::from("/var/log/kvmd"));
        assert_eq!(config.result_max_age, Some(Duration::from_secs(480)));
        assert_eq!(config.rpc_port, 8000);
    }

    #[test]
    fn test_invalid_numbers_fail_fast() {
        assert!(load(&[("KVMD_RPC_PORT", "http")]).is_err());
        assert!(load(&[("KVMD_RESULT_MAX_AGE_SECS", "-1")]).is_err());
    }
}
