//! pdlite.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Schedulers to register on first start. Once persisted, the stored
    /// configuration wins over these entries.
    #[serde(default)]
    pub schedulers: Vec<SchedulerEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 2379)),
            data_dir: PathBuf::from("/var/lib/pdlite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Maximum in-flight leader operators.
    pub leader_schedule_limit: u64,
    /// Maximum in-flight region operators.
    pub region_schedule_limit: u64,
    /// Pause between scheduling rounds.
    pub schedule_interval_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            leader_schedule_limit: 4,
            region_schedule_limit: 2048,
            schedule_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerEntry {
    #[serde(rename = "type")]
    pub scheduler_type: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl DaemonConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: DaemonConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.schedule.schedule_interval_ms == 0 {
            anyhow::bail!("schedule.schedule_interval_ms must be greater than 0");
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = DaemonConfig::from_toml_str("").unwrap();
        assert_eq!(config, DaemonConfig::default());
        assert_eq!(config.schedule.leader_schedule_limit, 4);
        assert!(config.schedulers.is_empty());
    }

    #[test]
    fn parse_full() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3379"
data_dir = "/tmp/pd"

[schedule]
leader_schedule_limit = 8

[[schedulers]]
type = "affinity"
args = ["a", "z"]
"#;
        let config = DaemonConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3379);
        assert_eq!(config.server.data_dir, PathBuf::from("/tmp/pd"));
        assert_eq!(config.schedule.leader_schedule_limit, 8);
        // Unset fields in a present section keep their defaults.
        assert_eq!(config.schedule.schedule_interval_ms, 1000);
        assert_eq!(config.schedulers.len(), 1);
        assert_eq!(config.schedulers[0].scheduler_type, "affinity");
        assert_eq!(config.schedulers[0].args, vec!["a", "z"]);
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = DaemonConfig::default();
        config.schedulers.push(SchedulerEntry {
            scheduler_type: "affinity".to_string(),
            args: vec!["a".to_string(), "b".to_string()],
        });
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("affinity"));
        assert_eq!(DaemonConfig::from_toml_str(&toml_str).unwrap(), config);
    }

    #[test]
    fn rejects_zero_schedule_interval() {
        let err = DaemonConfig::from_toml_str("[schedule]\nschedule_interval_ms = 0").unwrap_err();
        assert!(err.to_string().contains("schedule_interval_ms"));

        let mut config = DaemonConfig::default();
        assert!(config.validate().is_ok());
        config.schedule.schedule_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_listen_address() {
        let result = DaemonConfig::from_toml_str("[server]\nlisten = \"nope\"\ndata_dir = \"/x\"");
        assert!(result.is_err());
    }
}
