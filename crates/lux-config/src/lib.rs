//! lux configuration system
//!
//! Settings come from `lux.toml` in the project directory, then environment
//! variables override individual fields.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "lux.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LuxConfig {
    /// Where the show files live
    pub show: ShowConfig,
    /// Tick scheduling
    pub timing: TimingConfig,
    /// Transports frames are sent to
    pub output: OutputConfig,
    pub log: LogConfig,
}

/// Show file locations. Relative paths are resolved against the project
/// directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowConfig {
    pub devices_dir: PathBuf,
    /// Scene tree file. When unset, `tree.xml` then `tree.json` are tried.
    pub tree: Option<PathBuf>,
    pub style: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Milliseconds between two frames
    pub interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub artnet: Option<ArtNetConfig>,
    pub serial: Option<SerialConfig>,
    pub reconnect: ReconnectConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtNetConfig {
    /// `host:port` the ArtDmx packets are sent to
    pub target: String,
    pub universe: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Serial device, e.g. `/dev/ttyACM0`
    pub path: PathBuf,
    /// Bytes per write
    pub chunk_size: usize,
    /// Pause between two writes, in microseconds
    pub chunk_delay_us: u64,
}

/// Backoff between two attempts to reopen a failed transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    /// Log every changed frame
    pub verbose: bool,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            devices_dir: PathBuf::from("devices"),
            tree: None,
            style: PathBuf::from("style.css"),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { interval_ms: 20 }
    }
}

impl Default for ArtNetConfig {
    fn default() -> Self {
        Self {
            target: "255.255.255.255:6454".to_string(),
            universe: 0,
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/dev/ttyACM0"),
            chunk_size: 16,
            chunk_delay_us: 100,
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
        }
    }
}

impl ShowConfig {
    pub fn devices_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.devices_dir)
    }

    pub fn style_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.style)
    }

    /// The configured tree file, or the first of `tree.xml`, `tree.json`
    /// that exists. Falls back to `tree.xml` so the error names a file.
    pub fn tree_path(&self, project_dir: &Path) -> PathBuf {
        if let Some(tree) = &self.tree {
            return project_dir.join(tree);
        }
        ["tree.xml", "tree.json"]
            .iter()
            .map(|name| project_dir.join(name))
            .find(|path| path.exists())
            .unwrap_or_else(|| project_dir.join("tree.xml"))
    }
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl LuxConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `lux.toml` from `project_dir`, or return defaults if it is
    /// missing or unreadable.
    pub fn load_or_default(project_dir: &Path) -> Self {
        let path = project_dir.join(CONFIG_FILE_NAME);
        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(ConfigError::Read { .. }) => Self::default(),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring config file");
                Self::default()
            }
        }
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        self.merge_with(|key| std::env::var(key).ok());
    }

    /// Same as [`merge_with_env`](Self::merge_with_env) with a custom lookup.
    pub fn merge_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("LUX_INTERVAL_MS") {
            match val.parse::<u64>() {
                Ok(ms) if ms > 0 => self.timing.interval_ms = ms,
                _ => tracing::warn!(value = %val, "ignoring invalid LUX_INTERVAL_MS"),
            }
        }
        if let Some(dir) = lookup("LUX_DEVICES_DIR") {
            self.show.devices_dir = PathBuf::from(dir);
        }

        if let Some(target) = lookup("LUX_ARTNET_TARGET") {
            self.output.artnet.get_or_insert_with(Default::default).target = target;
        }
        if let Some(val) = lookup("LUX_ARTNET_UNIVERSE") {
            match val.parse::<u16>() {
                Ok(universe) => {
                    self.output.artnet.get_or_insert_with(Default::default).universe = universe
                }
                Err(_) => tracing::warn!(value = %val, "ignoring invalid LUX_ARTNET_UNIVERSE"),
            }
        }
        if let Some(path) = lookup("LUX_SERIAL_PATH") {
            self.output.serial.get_or_insert_with(Default::default).path = PathBuf::from(path);
        }

        if let Some(val) = lookup("LUX_VERBOSE") {
            self.log.verbose = parse_flag(&val);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// A malformed `lux.toml` is an error here, a missing one is not.
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let path = project_dir.join(CONFIG_FILE_NAME);
        let mut config = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            Self::default()
        };
        config.merge_with_env();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = LuxConfig::default();
        assert_eq!(config.timing.interval_ms, 20);
        assert_eq!(config.show.devices_dir, PathBuf::from("devices"));
        assert!(config.output.artnet.is_none());
        assert!(config.output.serial.is_none());
        assert!(!config.log.verbose);
    }

    #[test]
    fn test_toml_serialization() {
        let mut config = LuxConfig::default();
        config.output.serial = Some(SerialConfig::default());
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: LuxConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let parsed: LuxConfig = toml::from_str(
            r#"
            [timing]
            interval_ms = 40

            [output.artnet]
            universe = 3
            "#,
        )
        .unwrap();
        assert_eq!(parsed.timing.interval_ms, 40);
        let artnet = parsed.output.artnet.unwrap();
        assert_eq!(artnet.universe, 3);
        assert_eq!(artnet.target, "255.255.255.255:6454");
        assert_eq!(parsed.show.style, PathBuf::from("style.css"));
    }

    #[test]
    fn test_load_or_default() {
        // Should not panic even if lux.toml doesn't exist
        let dir = tempfile::tempdir().unwrap();
        let config = LuxConfig::load_or_default(dir.path());
        assert_eq!(config, LuxConfig::default());
    }

    #[test]
    fn test_load_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[timing]\ninterval_ms = \"fast\"").unwrap();
        assert!(matches!(
            LuxConfig::load(dir.path()),
            Err(ConfigError::Parse { .. })
        ));
        assert_eq!(LuxConfig::load_or_default(dir.path()), LuxConfig::default());
    }

    #[test]
    fn test_merge_with_lookup() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LUX_INTERVAL_MS", "25"),
            ("LUX_ARTNET_TARGET", "10.0.0.2:6454"),
            ("LUX_SERIAL_PATH", "/dev/ttyUSB1"),
            ("LUX_VERBOSE", "true"),
        ]);
        let mut config = LuxConfig::default();
        config.merge_with(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.timing.interval_ms, 25);
        assert_eq!(config.output.artnet.as_ref().unwrap().target, "10.0.0.2:6454");
        assert_eq!(config.output.artnet.as_ref().unwrap().universe, 0);
        assert_eq!(
            config.output.serial.as_ref().unwrap().path,
            PathBuf::from("/dev/ttyUSB1")
        );
        assert_eq!(config.output.serial.as_ref().unwrap().chunk_size, 16);
        assert!(config.log.verbose);
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let mut config = LuxConfig::default();
        config.merge_with(|key| match key {
            "LUX_INTERVAL_MS" => Some("0".to_string()),
            "LUX_ARTNET_UNIVERSE" => Some("many".to_string()),
            _ => None,
        });
        assert_eq!(config.timing.interval_ms, 20);
        assert!(config.output.artnet.is_none());
    }

    #[test]
    fn test_tree_path_probes_xml_then_json() {
        let dir = tempfile::tempdir().unwrap();
        let show = ShowConfig::default();
        assert_eq!(show.tree_path(dir.path()), dir.path().join("tree.xml"));
        std::fs::write(dir.path().join("tree.json"), "{}").unwrap();
        assert_eq!(show.tree_path(dir.path()), dir.path().join("tree.json"));
        std::fs::write(dir.path().join("tree.xml"), "<a/>").unwrap();
        assert_eq!(show.tree_path(dir.path()), dir.path().join("tree.xml"));
    }
}
