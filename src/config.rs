use std::fs;
use std::time::Duration;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::retry::RetryPolicy;

/// On-disk run configuration, every field optional.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub markers: Option<Vec<String>>,
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub pause_ms: Option<u64>,
    #[serde(default)]
    pub max_tries: Option<usize>,
    #[serde(default)]
    pub backoff_ms: Option<u64>,
}

/// Resolved run settings: config file values over defaults; CLI flags are
/// applied on top by the binary.
#[derive(Debug, Clone)]
pub struct Settings {
    pub markers: Vec<String>,
    pub batch_size: usize,
    /// Politeness pause after each external-call group. Rate-limit
    /// courtesy, not a correctness requirement; zero disables it.
    pub pause: Duration,
    pub retry: RetryPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            markers: default_markers(),
            batch_size: 10,
            pause: Duration::from_millis(350),
            retry: RetryPolicy::default(),
        }
    }
}

pub fn default_markers() -> Vec<String> {
    ["egtA", "egtB", "egtC", "egtD", "egtE"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolve settings from an optional config path. Without an explicit
    /// path, `synscan.json` in the working directory is used when present;
    /// otherwise defaults apply.
    pub fn resolve(path: Option<&Utf8Path>) -> Result<Settings, ScanError> {
        let config_path = match path {
            Some(path) => path.to_owned(),
            None => {
                let default = camino::Utf8PathBuf::from("synscan.json");
                if !default.as_std_path().exists() {
                    return Ok(Settings::default());
                }
                default
            }
        };

        let content = fs::read_to_string(config_path.as_std_path())
            .map_err(|_| ScanError::ConfigRead(config_path.as_std_path().to_path_buf()))?;
        let config: ConfigFile = serde_json::from_str(&content)
            .map_err(|err| ScanError::ConfigParse(err.to_string()))?;

        Ok(Self::resolve_config(config))
    }

    pub fn resolve_config(config: ConfigFile) -> Settings {
        let defaults = Settings::default();
        let retry = RetryPolicy::new(
            config.max_tries.unwrap_or(defaults.retry.max_tries),
            config
                .backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry.initial_delay),
        );
        Settings {
            markers: config.markers.unwrap_or(defaults.markers),
            batch_size: config.batch_size.unwrap_or(defaults.batch_size).max(1),
            pause: config
                .pause_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.pause),
            retry,
        }
    }
}
