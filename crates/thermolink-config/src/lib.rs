//! Shared configuration for the thermolink CLI and TUI.
//!
//! TOML profiles layered under `THERMOLINK_` environment variables, and
//! translation to `thermolink_core::SessionConfig`. Both binaries depend on
//! this crate; the CLI adds flag-aware wrappers on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use thermolink_core::{DEFAULT_BAUD_RATE, SessionConfig, TransportConfig};

/// Prefix for environment overrides. Nested keys use `__`, e.g.
/// `THERMOLINK_DEFAULTS__BAUD_RATE=115200`.
pub const ENV_PREFIX: &str = "THERMOLINK_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is given on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named sensor profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,

    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,

    /// Append a `Received: ...` log entry per line.
    #[serde(default = "default_true")]
    pub echo_lines: bool,

    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            baud_rate: default_baud_rate(),
            log_capacity: default_log_capacity(),
            read_buffer_size: default_read_buffer_size(),
            echo_lines: true,
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}
fn default_log_capacity() -> usize {
    thermolink_core::config::DEFAULT_LOG_CAPACITY
}
fn default_read_buffer_size() -> usize {
    TransportConfig::default().read_buffer_size
}
fn default_true() -> bool {
    true
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// A named sensor profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Serial port path (e.g. "/dev/ttyACM0", "COM3"). Auto-selected when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    /// Override the default baud rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baud_rate: Option<u32>,
}

impl Config {
    /// Name of the profile to use: the explicit one, else `default_profile`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
    }

    /// Look up the active profile.
    ///
    /// An explicitly requested profile must exist. A missing `default_profile`
    /// entry is fine and resolves to `None` (pure defaults).
    pub fn profile(&self, explicit: Option<&str>) -> Result<Option<&Profile>, ConfigError> {
        if let Some(name) = explicit {
            return self
                .profiles
                .get(name)
                .map(Some)
                .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() });
        }
        Ok(self
            .default_profile
            .as_deref()
            .and_then(|name| self.profiles.get(name)))
    }

    /// Reject values the transport cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("defaults.baud_rate", self.defaults.baud_rate)?;
        check_positive("defaults.log_capacity", self.defaults.log_capacity)?;
        check_positive("defaults.read_buffer_size", self.defaults.read_buffer_size)?;
        for (name, profile) in &self.profiles {
            if let Some(baud) = profile.baud_rate {
                check_positive(&format!("profiles.{name}.baud_rate"), baud)?;
            }
            if profile.port.as_deref().is_some_and(|p| p.trim().is_empty()) {
                return Err(ConfigError::Validation {
                    field: format!("profiles.{name}.port"),
                    reason: "must not be empty".into(),
                });
            }
        }
        Ok(())
    }
}

fn check_positive<T: Default + PartialEq>(field: &str, value: T) -> Result<(), ConfigError> {
    if value == T::default() {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(())
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "thermolink", "thermolink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("thermolink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file + environment. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// Load config, returning a default if it is missing or unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    cfg.validate()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation to core types ───────────────────────────────────────

/// Build a `SessionConfig` for the given (or default) profile.
pub fn resolve_session_config(
    cfg: &Config,
    profile: Option<&str>,
) -> Result<SessionConfig, ConfigError> {
    let profile = cfg.profile(profile)?;
    let baud_rate = profile
        .and_then(|p| p.baud_rate)
        .unwrap_or(cfg.defaults.baud_rate);

    Ok(SessionConfig {
        transport: TransportConfig {
            baud_rate,
            read_buffer_size: cfg.defaults.read_buffer_size,
        },
        log_capacity: cfg.defaults.log_capacity,
        echo_lines: cfg.defaults.echo_lines,
    })
}

/// The port configured for the given (or default) profile, if any.
pub fn resolve_port(cfg: &Config, profile: Option<&str>) -> Result<Option<String>, ConfigError> {
    Ok(cfg.profile(profile)?.and_then(|p| p.port.clone()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
default_profile = "greenhouse"

[defaults]
baud_rate = 19200
log_capacity = 50

[profiles.greenhouse]
port = "/dev/ttyACM0"

[profiles.bench]
port = "/dev/ttyUSB1"
baud_rate = 115200
"#;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.defaults.baud_rate, 9600);
        assert_eq!(cfg.defaults.log_capacity, 1000);
        assert_eq!(cfg.defaults.read_buffer_size, 256);
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.defaults.color, "auto");
        assert!(cfg.defaults.echo_lines);
    }

    // Loading reads THERMOLINK_* variables, so every test that loads runs
    // inside a Jail to stay isolated from the env-override test.

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let cfg = load_config_from(Path::new("absent.toml")).unwrap();
            assert_eq!(cfg, Config::default());
            Ok(())
        });
    }

    #[test]
    fn file_values_layer_over_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            let cfg = load_config_from(Path::new("config.toml")).unwrap();

            assert_eq!(cfg.default_profile.as_deref(), Some("greenhouse"));
            assert_eq!(cfg.defaults.baud_rate, 19200);
            assert_eq!(cfg.defaults.log_capacity, 50);
            assert_eq!(cfg.defaults.read_buffer_size, 256);
            assert_eq!(cfg.profiles.len(), 2);
            Ok(())
        });
    }

    #[test]
    fn profile_baud_overrides_default() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            let cfg = load_config_from(Path::new("config.toml")).unwrap();

            let bench = resolve_session_config(&cfg, Some("bench")).unwrap();
            assert_eq!(bench.transport.baud_rate, 115_200);
            assert_eq!(bench.log_capacity, 50);

            let default = resolve_session_config(&cfg, None).unwrap();
            assert_eq!(default.transport.baud_rate, 19200);
            assert_eq!(
                resolve_port(&cfg, None).unwrap().as_deref(),
                Some("/dev/ttyACM0")
            );
            Ok(())
        });
    }

    #[test]
    fn unknown_explicit_profile_is_an_error() {
        let cfg = Config::default();
        let err = resolve_session_config(&cfg, Some("attic")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { name } if name == "attic"));
    }

    #[test]
    fn missing_default_profile_falls_back_to_defaults() {
        let cfg = Config::default();
        let session = resolve_session_config(&cfg, None).unwrap();
        assert_eq!(session, SessionConfig::default());
        assert_eq!(resolve_port(&cfg, None).unwrap(), None);
    }

    #[test]
    fn zero_baud_rate_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[defaults]\nbaud_rate = 0\n")?;
            let err = load_config_from(Path::new("config.toml")).unwrap_err();
            assert!(
                matches!(err, ConfigError::Validation { field, .. } if field == "defaults.baud_rate")
            );
            Ok(())
        });
    }

    #[test]
    fn save_then_load_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                port: Some("COM3".into()),
                baud_rate: None,
            },
        );
        save_config_to(&cfg, &path).unwrap();

        Jail::expect_with(|_jail| {
            let loaded = load_config_from(&path).unwrap();
            assert_eq!(loaded, cfg);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("THERMOLINK_DEFAULTS__BAUD_RATE", "57600");
            jail.set_env("THERMOLINK_DEFAULT_PROFILE", "bench");

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.defaults.baud_rate, 57600);
            assert_eq!(cfg.default_profile.as_deref(), Some("bench"));
            Ok(())
        });
    }
}
