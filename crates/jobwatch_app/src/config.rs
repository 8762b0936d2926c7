use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jobwatch_core::DisplayZone;
use jobwatch_engine::{ClientSettings, PollSettings};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;
use crate::logging::LogDestination;

const DEFAULT_CONFIG_FILE: &str = "jobwatch.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("could not serialize config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub display_utc_offset_minutes: i32,
    pub log_level: String,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            poll_interval_ms: 1000,
            connect_timeout_ms: 5000,
            request_timeout_ms: 10000,
            display_utc_offset_minutes: 9 * 60,
            log_level: "info".to_string(),
            log_destination: LogDestination::File,
        }
    }
}

impl AppConfig {
    /// Reads `path`, or `./jobwatch.ron` when no path is given, and returns the
    /// file that was actually read alongside the config.
    ///
    /// A missing default file means defaults; a missing explicit file is an error.
    /// Nothing is logged here since the logger is configured from the result.
    pub fn load(path: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound && !explicit => {
                return Ok((Self::default(), None));
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        let config =
            ron::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        Ok((config, Some(path)))
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(base_url) = &cli.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(interval_ms) = cli.interval_ms {
            self.poll_interval_ms = interval_ms;
        }
        if let Some(offset) = cli.utc_offset_minutes {
            self.display_utc_offset_minutes = offset;
        }
    }

    pub fn level(&self) -> Result<LevelFilter, ConfigError> {
        jobwatch_logging::parse_level(&self.log_level)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown log level {:?}", self.log_level)))
    }

    pub fn poll_settings(&self) -> Result<PollSettings, ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be positive".to_string(),
            ));
        }
        let zone = DisplayZone::from_offset_minutes(self.display_utc_offset_minutes).ok_or_else(
            || {
                ConfigError::Invalid(format!(
                    "display_utc_offset_minutes {} is out of range",
                    self.display_utc_offset_minutes
                ))
            },
        )?;
        Ok(PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms),
            zone,
        })
    }

    pub fn client_settings(&self) -> Result<ClientSettings, ConfigError> {
        let settings = ClientSettings::new(&self.base_url)
            .map_err(|err| ConfigError::Invalid(format!("base_url: {}", err)))?;
        Ok(ClientSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            ..settings
        })
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::new(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jobwatch.ron");
        fs::write(
            &path,
            r#"(base_url: "https://api.example.com/v1", log_destination: Both)"#,
        )
        .unwrap();

        let (config, source) = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(source, Some(path));
        assert_eq!(config.base_url, "https://api.example.com/v1");
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.display_utc_offset_minutes, 540);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = AppConfig::load(Some(&temp.path().join("absent.ron"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.ron");
        fs::write(&path, "(poll_interval_ms: \"soon\")").unwrap();
        assert!(matches!(
            AppConfig::load(Some(&path)).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn printed_config_loads_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jobwatch.ron");
        let config = AppConfig {
            poll_interval_ms: 250,
            ..AppConfig::default()
        };
        fs::write(&path, config.to_ron().unwrap()).unwrap();
        assert_eq!(AppConfig::load(Some(&path)).unwrap().0, config);
    }

    #[test]
    fn cli_flags_override_file_values() {
        let cli = Cli::parse_from([
            "jobwatch",
            "bonds_1",
            "--base-url",
            "http://10.0.0.5/api",
            "--interval-ms",
            "500",
            "--utc-offset-minutes",
            "-300",
        ]);
        let mut config = AppConfig::default();
        config.apply_cli(&cli);
        assert_eq!(config.base_url, "http://10.0.0.5/api");
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.display_utc_offset_minutes, -300);
        assert!(config.poll_settings().is_ok());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let config = AppConfig {
            poll_interval_ms: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.poll_settings(), Err(ConfigError::Invalid(_))));

        let config = AppConfig {
            display_utc_offset_minutes: 24 * 60,
            ..AppConfig::default()
        };
        assert!(config.poll_settings().is_err());

        let config = AppConfig {
            log_level: "chatty".into(),
            ..AppConfig::default()
        };
        assert!(config.level().is_err());

        let config = AppConfig {
            base_url: "::".into(),
            ..AppConfig::default()
        };
        assert!(config.client_settings().is_err());
    }
}
