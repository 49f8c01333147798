//! Config subcommand handlers.

use dialoguer::{Input, Select};

use thermolink_core::DEFAULT_BAUD_RATE;
use thermolink_serial::list_ports;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# unable to render config: {e}\n"))
}

/// Offer detected ports plus "auto" and "enter manually".
fn prompt_port() -> Result<Option<String>, CliError> {
    let ports = list_ports().unwrap_or_default();

    let mut choices: Vec<String> = vec!["Auto-detect (first USB serial device)".into()];
    choices.extend(
        ports
            .iter()
            .map(|p| format!("{:<20} {}", p.name, p.description())),
    );
    choices.push("Enter a path manually".into());

    let selection = Select::new()
        .with_prompt("Sensor port")
        .items(&choices)
        .default(if ports.is_empty() { 0 } else { 1 })
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        return Ok(None);
    }
    if let Some(port) = ports.get(selection - 1) {
        return Ok(Some(port.name.clone()));
    }

    let path: String = Input::new()
        .with_prompt("Port path")
        .interact_text()
        .map_err(prompt_err)?;
    Ok(Some(path))
}

fn parse_baud(value: &str) -> Result<u32, CliError> {
    match value.parse::<u32>() {
        Ok(baud) if baud > 0 => Ok(baud),
        _ => Err(CliError::Validation {
            field: "baud_rate".into(),
            reason: format!("'{value}' is not a positive integer"),
        }),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_file(global);
            eprintln!("thermolink configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let port = prompt_port()?;

            let baud: String = Input::new()
                .with_prompt("Baud rate")
                .default(DEFAULT_BAUD_RATE.to_string())
                .interact_text()
                .map_err(prompt_err)?;
            let baud = parse_baud(&baud)?;

            let mut cfg = config::load(global).unwrap_or_default();
            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    port,
                    baud_rate: (baud != DEFAULT_BAUD_RATE).then_some(baud),
                },
            );
            cfg.default_profile = Some(profile_name.clone());

            let path = config::save(global, &cfg)?;
            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Try it: thermolink monitor");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let format = config::output_format(global, &cfg);
            let out = output::render_single(format, &cfg, format_config, |c| {
                config::active_profile_name(global, c)
            })?;
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_file(global).display());
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load(global)?;
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            match key.as_str() {
                "port" => profile.port = Some(value),
                "baud_rate" | "baud-rate" | "baud" => profile.baud_rate = Some(parse_baud(&value)?),
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!("unknown config key '{other}'. Valid keys: port, baud_rate"),
                    });
                }
            }

            config::save(global, &cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load(global)?;
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: thermolink config init");
            } else {
                for (name, profile) in &cfg.profiles {
                    let marker = if name == default { " *" } else { "" };
                    let port = profile.port.as_deref().unwrap_or("auto");
                    println!("{name}{marker}\t{port}");
                }
            }
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load(global)?;

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save(global, &cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baud_must_be_positive_integer() {
        assert_eq!(parse_baud("115200").ok(), Some(115_200));
        assert!(parse_baud("0").is_err());
        assert!(parse_baud("fast").is_err());
    }
}
