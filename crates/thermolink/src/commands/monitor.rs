//! `thermolink monitor`: connect to the sensor and stream readings.
//!
//! Readings go to stdout in the selected output format; status and log lines
//! go to stderr. Ctrl-C, `--count`, or the device closing the stream end the
//! session with a clean disconnect.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use dialoguer::Select;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use thermolink_core::{
    Affordance, ConnectionManager, LogEntry, Presenter, Reading, Session, StatusKind,
};
use thermolink_serial::{
    Error as SerialError, NativeHost, NativeTransport, PortSelection, SerialHost,
    SerialTransport, list_ports,
};

use crate::cli::{GlobalOpts, MonitorArgs, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

// ── Output record ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ReadingRecord {
    timestamp: DateTime<Local>,
    temperature: f64,
    humidity: f64,
}

impl From<&Reading> for ReadingRecord {
    fn from(r: &Reading) -> Self {
        Self {
            timestamp: Local::now(),
            temperature: r.temperature,
            humidity: r.humidity,
        }
    }
}

fn detail_line(r: &ReadingRecord) -> String {
    let reading = Reading::new(r.temperature, r.humidity);
    format!("{}  {reading}", r.timestamp.format("%H:%M:%S"))
}

fn plain_line(r: &ReadingRecord) -> String {
    let reading = Reading::new(r.temperature, r.humidity);
    format!(
        "{},{}",
        reading.temperature_display(),
        reading.humidity_display()
    )
}

// ── Presenter ───────────────────────────────────────────────────────

/// Terminal presenter for a monitor session.
struct CliPresenter {
    format: OutputFormat,
    quiet: bool,
    color: bool,
    spinner: ProgressBar,
    shown: u64,
    limit: Option<u64>,
    cancel: CancellationToken,
    render_error: Option<CliError>,
}

impl CliPresenter {
    fn stderr_line(&self, line: &str) {
        if !self.quiet {
            self.spinner.suspend(|| eprintln!("{line}"));
        }
    }

    fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.shown >= limit)
    }

    fn finish(self) -> Option<CliError> {
        self.spinner.finish_and_clear();
        self.render_error
    }
}

impl Presenter for CliPresenter {
    fn show_reading(&mut self, reading: &Reading) {
        // One chunk can carry several lines; the limit holds within a chunk.
        if self.limit_reached() || self.render_error.is_some() {
            return;
        }

        let record = ReadingRecord::from(reading);
        match output::render_single(self.format, &record, detail_line, plain_line) {
            Ok(out) => output::print_output(&out, self.quiet),
            Err(err) => {
                self.render_error = Some(err);
                self.cancel.cancel();
                return;
            }
        }

        self.shown += 1;
        if self.limit_reached() {
            debug!(shown = self.shown, "reading limit reached");
            self.cancel.cancel();
        }
    }

    fn set_status(&mut self, text: &str, kind: StatusKind) {
        self.spinner.set_message(text.to_owned());
        self.stderr_line(&output::paint_status(text, kind, self.color));
    }

    fn append_log(&mut self, entry: LogEntry) {
        let line = entry.to_string();
        if self.color {
            use owo_colors::OwoColorize;
            self.stderr_line(&line.dimmed().to_string());
        } else {
            self.stderr_line(&line);
        }
    }

    fn set_affordance(&mut self, affordance: Affordance) {
        if affordance == Affordance::Busy {
            self.spinner.enable_steady_tick(Duration::from_millis(100));
        } else {
            self.spinner.disable_steady_tick();
            self.spinner.finish_and_clear();
        }
    }
}

fn spinner(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar
}

// ── Interactive port selection ──────────────────────────────────────

/// Host that asks the user which port to open.
struct PromptHost;

#[async_trait]
impl SerialHost for PromptHost {
    async fn request_port(&self) -> Result<Box<dyn SerialTransport>, SerialError> {
        let ports = list_ports()?;
        if ports.is_empty() {
            return Err(SerialError::NoPorts);
        }

        let items: Vec<String> = ports
            .iter()
            .map(|p| format!("{:<20} {}", p.name, p.description()))
            .collect();

        let choice = tokio::task::spawn_blocking(move || {
            Select::new()
                .with_prompt("Select the sensor's serial port")
                .items(&items)
                .default(0)
                .interact_opt()
        })
        .await
        .map_err(|e| SerialError::Control(e.to_string()))?
        .map_err(|e| SerialError::Control(e.to_string()))?;

        let name = choice
            .and_then(|index| ports.get(index))
            .map(|p| p.name.clone())
            .ok_or(SerialError::NoPortSelected)?;
        Ok(Box::new(NativeTransport::new(name)))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: &MonitorArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let mut session_config = config::session_config(global, cfg)?;
    session_config.echo_lines = args.echo;

    let host: Box<dyn SerialHost> = if args.select {
        Box::new(PromptHost)
    } else {
        let selection = config::port(global, cfg)?.map_or(PortSelection::Auto, PortSelection::Named);
        Box::new(NativeHost::new(selection))
    };

    let cancel = CancellationToken::new();
    let presenter = CliPresenter {
        format: config::output_format(global, cfg),
        quiet: global.quiet,
        color: output::should_color(config::color_mode(global, cfg)),
        // The spinner would fight the selection prompt for the terminal.
        spinner: spinner(global.quiet || args.select),
        shown: 0,
        limit: args.count,
        cancel: cancel.clone(),
        render_error: None,
    };

    let manager = ConnectionManager::new(host, session_config);
    let (session, handle) = Session::new(manager, presenter, cancel.clone());

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            () = interrupt.cancelled() => {}
            res = tokio::signal::ctrl_c() => {
                if res.is_ok() {
                    debug!("interrupt received, disconnecting");
                    interrupt.cancel();
                }
            }
        }
    });

    handle.connect().await?;
    // Without a live handle the session ends on its own once the
    // connection closes.
    drop(handle);

    let outcome = session.run().await;
    cancel.cancel();

    if let Some(err) = outcome.presenter.finish() {
        return Err(err);
    }
    match outcome.last_error {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
