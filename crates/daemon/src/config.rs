//! Daemon configuration from environment variables
//!
//! Read once at startup; the supervisor never re-reads it mid-run.

use anyhow::{anyhow, Context, Result};
use poolwarden_core::application::supervisor::constants::DEFAULT_TERMINATE_GRACE;
use poolwarden_core::domain::{Pid, SupervisorConfig};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_MASTER_PID: &str = "POOLWARDEN_MASTER_PID";
pub const ENV_WORKERS: &str = "POOLWARDEN_WORKERS";
pub const ENV_MASTER_TIMEOUT_SECS: &str = "POOLWARDEN_MASTER_TIMEOUT_SECS";
pub const ENV_REFRESH_INTERVAL_SECS: &str = "POOLWARDEN_REFRESH_INTERVAL_SECS";
pub const ENV_REFRESH_BATCH_SIZE: &str = "POOLWARDEN_REFRESH_BATCH_SIZE";
pub const ENV_RELOAD_ON_PLUGIN_CHANGE: &str = "POOLWARDEN_RELOAD_ON_PLUGIN_CHANGE";
pub const ENV_PLUGINS_DIR: &str = "POOLWARDEN_PLUGINS_DIR";
pub const ENV_READY_MARKER: &str = "POOLWARDEN_READY_MARKER";
pub const ENV_TERMINATE_GRACE_SECS: &str = "POOLWARDEN_TERMINATE_GRACE_SECS";

/// Everything the composition root needs
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub supervisor: SupervisorConfig,
    /// SIGTERM -> SIGKILL grace when tearing down the master
    pub terminate_grace: Duration,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let master_pid: Pid = lookup(ENV_MASTER_PID)
            .ok_or_else(|| anyhow!("{} is required", ENV_MASTER_PID))?
            .trim()
            .parse()
            .with_context(|| format!("{} must be a process id", ENV_MASTER_PID))?;

        let defaults = SupervisorConfig::new(master_pid);
        let plugins_dir = match lookup(ENV_PLUGINS_DIR) {
            Some(dir) => dir,
            None => defaults.plugins_dir.to_string_lossy().into_owned(),
        };

        let supervisor = SupervisorConfig {
            target_worker_count: parse_or(&lookup, ENV_WORKERS, defaults.target_worker_count)?,
            startup_timeout: secs_or(&lookup, ENV_MASTER_TIMEOUT_SECS, defaults.startup_timeout)?,
            refresh_interval: secs_or(
                &lookup,
                ENV_REFRESH_INTERVAL_SECS,
                defaults.refresh_interval,
            )?,
            refresh_batch_size: parse_or(
                &lookup,
                ENV_REFRESH_BATCH_SIZE,
                defaults.refresh_batch_size,
            )?,
            reload_on_plugin_change: bool_or(
                &lookup,
                ENV_RELOAD_ON_PLUGIN_CHANGE,
                defaults.reload_on_plugin_change,
            )?,
            plugins_dir: PathBuf::from(shellexpand::tilde(&plugins_dir).into_owned()),
            ready_marker: lookup(ENV_READY_MARKER).unwrap_or(defaults.ready_marker.clone()),
            ..defaults
        };
        supervisor.validate()?;

        Ok(Self {
            supervisor,
            terminate_grace: secs_or(&lookup, ENV_TERMINATE_GRACE_SECS, DEFAULT_TERMINATE_GRACE)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

fn secs_or<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(lookup, key, default.as_secs()).map(Duration::from_secs)
}

fn bool_or<F>(lookup: &F, key: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("invalid boolean for {}: {:?}", key, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<DaemonConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DaemonConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_master_pid_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains(ENV_MASTER_PID));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[(ENV_MASTER_PID, "1234")]).unwrap();

        assert_eq!(config.supervisor.master_pid, 1234);
        assert_eq!(config.supervisor.target_worker_count, 4);
        assert_eq!(config.supervisor.startup_timeout, Duration::from_secs(120));
        assert_eq!(config.supervisor.refresh_interval, Duration::from_secs(6000));
        assert_eq!(config.supervisor.refresh_batch_size, 1);
        assert!(!config.supervisor.reload_on_plugin_change);
        assert!(config.supervisor.plugins_dir.ends_with("poolwarden/plugins"));
        assert_eq!(config.terminate_grace, DEFAULT_TERMINATE_GRACE);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            (ENV_MASTER_PID, "99"),
            (ENV_WORKERS, "8"),
            (ENV_MASTER_TIMEOUT_SECS, "10"),
            (ENV_REFRESH_INTERVAL_SECS, "30"),
            (ENV_REFRESH_BATCH_SIZE, "2"),
            (ENV_RELOAD_ON_PLUGIN_CHANGE, "yes"),
            (ENV_PLUGINS_DIR, "/srv/plugins"),
            (ENV_READY_MARKER, "<ready>"),
            (ENV_TERMINATE_GRACE_SECS, "5"),
        ])
        .unwrap();

        assert_eq!(config.supervisor.target_worker_count, 8);
        assert_eq!(config.supervisor.startup_timeout, Duration::from_secs(10));
        assert_eq!(config.supervisor.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.supervisor.refresh_batch_size, 2);
        assert!(config.supervisor.reload_on_plugin_change);
        assert_eq!(config.supervisor.plugins_dir, PathBuf::from("/srv/plugins"));
        assert_eq!(config.supervisor.ready_marker, "<ready>");
        assert_eq!(config.terminate_grace, Duration::from_secs(5));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = load(&[(ENV_MASTER_PID, "1"), (ENV_WORKERS, "0")]).unwrap_err();
        assert!(err.to_string().contains("target_worker_count"));
    }

    #[test]
    fn test_garbage_values_rejected() {
        assert!(load(&[(ENV_MASTER_PID, "abc")]).is_err());
        assert!(load(&[(ENV_MASTER_PID, "1"), (ENV_REFRESH_BATCH_SIZE, "-1")]).is_err());
        assert!(load(&[(ENV_MASTER_PID, "1"), (ENV_RELOAD_ON_PLUGIN_CHANGE, "maybe")]).is_err());
    }
}
