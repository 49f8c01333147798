//! `thermolink ports`: list serial ports.

use tabled::Tabled;
use thermolink_serial::{PortInfo, list_ports};

use crate::cli::GlobalOpts;
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "Port")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Device")]
    description: String,
}

impl From<&PortInfo> for PortRow {
    fn from(p: &PortInfo) -> Self {
        Self {
            name: p.name.clone(),
            kind: p.kind.label().into(),
            description: p.description(),
        }
    }
}

pub fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let ports = list_ports().map_err(thermolink_core::CoreError::from)?;

    if ports.is_empty() {
        if !global.quiet {
            eprintln!("No serial ports found.");
        }
        return Ok(());
    }

    let format = config::output_format(global, cfg);
    let out = output::render_list(format, &ports, |p| PortRow::from(p), |p| p.name.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
