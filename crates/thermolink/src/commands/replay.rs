//! `thermolink replay`: parse captured sensor output offline.
//!
//! Feeds a capture (file or stdin) through the same decoder, line buffer,
//! and parser the live session uses. A final line without a trailing
//! newline still counts, since the capture has ended.

use std::path::Path;

use serde::Serialize;
use tabled::Tabled;
use tokio::io::AsyncReadExt;
use tracing::debug;

use thermolink_core::{LineBuffer, Reading, parse_line};
use thermolink_serial::Utf8ChunkDecoder;

use crate::cli::{GlobalOpts, ReplayArgs};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayRecord {
    /// 1-based line number in the capture.
    pub line: usize,
    pub temperature: f64,
    pub humidity: f64,
}

#[derive(Tabled)]
struct ReplayRow {
    #[tabled(rename = "Line")]
    line: usize,
    #[tabled(rename = "Temperature (°C)")]
    temperature: String,
    #[tabled(rename = "Humidity (%)")]
    humidity: String,
}

impl ReplayRecord {
    fn reading(&self) -> Reading {
        Reading::new(self.temperature, self.humidity)
    }
}

impl From<&ReplayRecord> for ReplayRow {
    fn from(r: &ReplayRecord) -> Self {
        let reading = r.reading();
        Self {
            line: r.line,
            temperature: reading.temperature_display(),
            humidity: reading.humidity_display(),
        }
    }
}

/// Result of replaying one capture.
#[derive(Debug, Default)]
pub struct Replay {
    pub records: Vec<ReplayRecord>,
    /// Non-blank lines that did not parse.
    pub skipped: usize,
}

/// Parse a raw capture. Blank lines are ignored; malformed ones are counted.
pub fn replay_bytes(bytes: &[u8]) -> Replay {
    let mut decoder = Utf8ChunkDecoder::new();
    let mut text = decoder.decode(bytes);
    if let Some(tail) = decoder.finish() {
        text.push_str(&tail);
    }

    let mut buffer = LineBuffer::new();
    let mut lines = buffer.push(&text);
    if !buffer.is_empty() {
        lines.push(buffer.partial().to_owned());
    }

    let mut replay = Replay::default();
    for (index, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(reading) => replay.records.push(ReplayRecord {
                line: index + 1,
                temperature: reading.temperature,
                humidity: reading.humidity,
            }),
            Err(reason) => {
                debug!(line = index + 1, %reason, "skipping malformed line");
                replay.skipped += 1;
            }
        }
    }
    replay
}

async fn read_input(file: Option<&Path>) -> Result<Vec<u8>, CliError> {
    match file {
        Some(path) if path != Path::new("-") => Ok(tokio::fs::read(path).await?),
        _ => {
            let mut bytes = Vec::new();
            tokio::io::stdin().read_to_end(&mut bytes).await?;
            Ok(bytes)
        }
    }
}

pub async fn handle(args: &ReplayArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let bytes = read_input(args.file.as_deref()).await?;
    let replay = replay_bytes(&bytes);

    let format = config::output_format(global, cfg);
    let out = output::render_list(format, &replay.records, |r| ReplayRow::from(r), |r| {
        let reading = r.reading();
        format!(
            "{},{}",
            reading.temperature_display(),
            reading.humidity_display()
        )
    })?;
    output::print_output(&out, global.quiet);

    if !global.quiet {
        eprintln!(
            "{} readings, {} malformed lines skipped",
            replay.records.len(),
            replay.skipped
        );
    }
    Ok(())
}
