//! CLI configuration: thin wrapper around `thermolink_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--config,
//! --port, --baud, --output, --color).

use std::path::PathBuf;

use clap::ValueEnum;
use thermolink_core::SessionConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use thermolink_config::{Config, Profile};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file in effect: `--config` if given, else the platform path.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(thermolink_config::config_path)
}

/// Load the config file in effect. A missing file yields defaults.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(thermolink_config::load_config_from(&config_file(global))?)
}

pub fn save(global: &GlobalOpts, cfg: &Config) -> Result<PathBuf, CliError> {
    let path = config_file(global);
    thermolink_config::save_config_to(cfg, &path)?;
    Ok(path)
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config
        .active_profile_name(global.profile.as_deref())
        .unwrap_or_else(|| "default".into())
}

/// Build the session config: profile and defaults, then flag overrides.
pub fn session_config(global: &GlobalOpts, cfg: &Config) -> Result<SessionConfig, CliError> {
    let mut session = thermolink_config::resolve_session_config(cfg, global.profile.as_deref())
        .map_err(|e| profile_error(e, cfg))?;

    if let Some(baud) = global.baud {
        if baud == 0 {
            return Err(CliError::Validation {
                field: "baud".into(),
                reason: "must be greater than zero".into(),
            });
        }
        session.transport.baud_rate = baud;
    }
    Ok(session)
}

/// Port to open: `--port`, else the profile's port, else auto-select.
pub fn port(global: &GlobalOpts, cfg: &Config) -> Result<Option<String>, CliError> {
    if let Some(port) = &global.port {
        return Ok(Some(port.clone()));
    }
    thermolink_config::resolve_port(cfg, global.profile.as_deref()).map_err(|e| profile_error(e, cfg))
}

/// Output format: flag, else `defaults.output`, else table.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&cfg.defaults.output, true).ok())
        .unwrap_or(OutputFormat::Table)
}

pub fn color_mode(global: &GlobalOpts, cfg: &Config) -> ColorMode {
    global
        .color
        .or_else(|| ColorMode::from_str(&cfg.defaults.color, true).ok())
        .unwrap_or(ColorMode::Auto)
}

/// Turn an unknown-profile error into one that lists what exists.
pub fn profile_error(err: thermolink_config::ConfigError, cfg: &Config) -> CliError {
    match err {
        thermolink_config::ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
            name,
            available: available_profiles(cfg),
        },
        other => other.into(),
    }
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
