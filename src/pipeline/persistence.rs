// Station settings, read on startup and written back on quit. Only tempo,
// signature and timer settings live here; pad selections are not saved.
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::clock::{DEFAULT_TEMPO, Tempo, TimeSignature};
use crate::error::ConfigError;
use crate::scheduler::{SchedulerConfig, TransportConfig};

const STATE_DIR: &str = ".loopstation";
const CONFIG_FILE: &str = "config.json";
pub const LOG_FILE: &str = "loopstation.log";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    pub tempo: f64,
    pub signature: String,
    pub tick_interval_ms: u64,
    pub schedule_ahead_ms: u64,
}

impl Default for StationConfig {
    fn default() -> Self {
        let scheduler = SchedulerConfig::default();
        Self {
            tempo: DEFAULT_TEMPO,
            signature: TimeSignature::default().to_string(),
            tick_interval_ms: scheduler.tick_interval().as_millis() as u64,
            schedule_ahead_ms: scheduler.schedule_ahead().as_millis() as u64,
        }
    }
}

impl StationConfig {
    pub fn transport(&self) -> Result<TransportConfig, ConfigError> {
        Ok(TransportConfig {
            tempo: Tempo::new(self.tempo)?,
            signature: self.signature.parse()?,
        })
    }

    pub fn scheduler(&self) -> Result<SchedulerConfig, ConfigError> {
        SchedulerConfig::new(
            Duration::from_millis(self.tick_interval_ms),
            Duration::from_millis(self.schedule_ahead_ms),
        )
    }

    pub fn remember_transport(&mut self, transport: TransportConfig) {
        self.tempo = transport.tempo.bpm();
        self.signature = transport.signature.to_string();
    }
}

// <project_dir>/.loopstation/
pub fn state_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(STATE_DIR)
}

fn config_file_path(project_dir: &Path) -> PathBuf {
    state_dir(project_dir).join(CONFIG_FILE)
}

/// Missing file means defaults; a file that exists but doesn't parse is an error.
pub fn load_config(project_dir: &Path) -> anyhow::Result<StationConfig> {
    let path = config_file_path(project_dir);
    if !path.exists() {
        return Ok(StationConfig::default());
    }
    let data = std::fs::read_to_string(&path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("invalid settings in {}", path.display()))
}

pub fn save_config(project_dir: &Path, config: &StationConfig) -> anyhow::Result<()> {
    let path = config_file_path(project_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?; // create .loopstation/ if needed
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config, StationConfig::default());
        assert_eq!(config.signature, "4/4");
        assert_eq!(config.tick_interval_ms, 25);
        assert_eq!(config.schedule_ahead_ms, 100);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(state_dir(dir.path())).unwrap();
        let json = r#"{ "tempo": 92.0, "signature": "6/8" }"#;
        std::fs::write(config_file_path(dir.path()), json).unwrap();

        let config = load_config(dir.path()).unwrap();
        let transport = config.transport().unwrap();
        assert_eq!(transport.tempo.bpm(), 92.0);
        assert_eq!(transport.signature.beats_per_measure(), 6);
        assert_eq!(config.scheduler().unwrap(), SchedulerConfig::default());
    }

    #[test]
    fn save_then_load_keeps_transport() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StationConfig::default();
        config.remember_transport(TransportConfig {
            tempo: Tempo::new(133.0).unwrap(),
            signature: TimeSignature::new(5, 4).unwrap(),
        });
        save_config(dir.path(), &config).unwrap();
        assert_eq!(load_config(dir.path()).unwrap(), config);
    }

    #[test]
    fn bad_values_are_rejected() {
        let config = StationConfig { tempo: 0.0, ..Default::default() };
        assert_eq!(config.transport(), Err(ConfigError::InvalidTempo(0.0)));

        let config = StationConfig { tempo: 1e20, ..Default::default() };
        assert_eq!(config.transport(), Err(ConfigError::InvalidTempo(1e20)));

        let config = StationConfig { signature: "4".into(), ..Default::default() };
        assert!(config.transport().is_err());

        let config = StationConfig {
            tick_interval_ms: 100,
            schedule_ahead_ms: 50,
            ..Default::default()
        };
        assert!(config.scheduler().is_err());
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(state_dir(dir.path())).unwrap();
        std::fs::write(config_file_path(dir.path()), "tempo = 120").unwrap();
        assert!(load_config(dir.path()).is_err());
    }
}
