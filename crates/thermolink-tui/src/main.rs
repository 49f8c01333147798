//! `thermolink-tui`: live terminal dashboard for a serial climate sensor.
//!
//! Built on [ratatui](https://ratatui.rs). A background session task owns
//! the serial connection and reports every reading, status change, and log
//! line to the UI as an [`Action`](action::Action). `c` or Enter toggles the
//! connection, `?` shows help, `q` quits.
//!
//! Logs are written to a file (default `/tmp/thermolink-tui.log`) to avoid
//! corrupting the terminal UI.

mod action;
mod app;
mod component;
mod event;
mod monitor;
mod session_bridge;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use thermolink_core::{ConnectionManager, Session, SessionConfig};
use thermolink_serial::{NativeHost, PortSelection};

use crate::app::App;
use crate::session_bridge::ActionPresenter;

/// Terminal dashboard for a serial temperature and humidity sensor.
#[derive(Parser, Debug)]
#[command(name = "thermolink-tui", version, about)]
struct Cli {
    /// Sensor profile from the config file
    #[arg(short = 'p', long, env = "THERMOLINK_PROFILE")]
    profile: Option<String>,

    /// Serial port path (overrides profile)
    #[arg(short = 'P', long, env = "THERMOLINK_PORT")]
    port: Option<String>,

    /// Baud rate (overrides profile and defaults)
    #[arg(short = 'b', long, env = "THERMOLINK_BAUD")]
    baud: Option<u32>,

    /// Config file to use instead of the platform default
    #[arg(long, env = "THERMOLINK_CONFIG")]
    config: Option<PathBuf>,

    /// Connect as soon as the dashboard opens
    #[arg(short = 'c', long)]
    connect: bool,

    /// Log file path (defaults to /tmp/thermolink-tui.log)
    #[arg(long, default_value = "/tmp/thermolink-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr, that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "thermolink_tui={log_level},thermolink_core={log_level},thermolink_serial={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("thermolink-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Resolve session settings and port from the config file and flags.
fn resolve(cli: &Cli) -> Result<(SessionConfig, PortSelection)> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(thermolink_config::config_path);
    let cfg = thermolink_config::load_config_from(&path)
        .wrap_err_with(|| format!("loading {}", path.display()))?;

    let mut session = thermolink_config::resolve_session_config(&cfg, cli.profile.as_deref())?;
    if let Some(baud) = cli.baud.filter(|b| *b > 0) {
        session.transport.baud_rate = baud;
    }

    let port = match &cli.port {
        Some(port) => Some(port.clone()),
        None => thermolink_config::resolve_port(&cfg, cli.profile.as_deref())?,
    };
    Ok((session, port.map_or(PortSelection::Auto, PortSelection::Named)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file, hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    let (session_config, selection) = resolve(&cli)?;
    info!(
        port = ?selection,
        baud = session_config.transport.baud_rate,
        "starting thermolink-tui"
    );

    let (action_tx, action_rx) = mpsc::unbounded_channel();
    let log_capacity = session_config.log_capacity;
    let manager = ConnectionManager::new(Box::new(NativeHost::new(selection)), session_config);
    let (session, handle) = Session::new(
        manager,
        ActionPresenter::new(action_tx.clone()),
        CancellationToken::new(),
    );
    let session_task = tokio::spawn(session.run());

    let mut app = App::new(handle.clone(), action_tx, action_rx, log_capacity);
    if cli.connect {
        app.request_toggle();
    }
    let result = app.run().await;

    // Disconnect cleanly before the process exits.
    handle.shutdown();
    drop(handle);
    if let Err(e) = session_task.await {
        tracing::warn!(error = %e, "session task did not shut down cleanly");
    }

    result
}
