//! Monitor view: latest reading, recent history, connection status, and the
//! on-screen log.

use std::collections::VecDeque;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Sparkline},
};

use thermolink_core::{Affordance, LogBuffer, Reading, StatusKind};

use crate::action::Action;
use crate::component::Component;
use crate::event::TICK_RATE;
use crate::theme;
use crate::widgets::status_indicator;

/// Readings kept for the sparklines.
const HISTORY_LEN: usize = 240;

const PLACEHOLDER: &str = "--.-";

pub struct MonitorView {
    latest: Option<Reading>,
    history: VecDeque<Reading>,
    readings_seen: u64,
    status: String,
    status_kind: StatusKind,
    affordance: Affordance,
    log: LogBuffer,
    /// Entries scrolled up from the newest one.
    log_scroll: usize,
    /// Ticks since the last reading arrived.
    ticks_since_reading: Option<u32>,
}

impl MonitorView {
    pub fn new(log_capacity: usize) -> Self {
        Self {
            latest: None,
            history: VecDeque::with_capacity(HISTORY_LEN),
            readings_seen: 0,
            status: "Not connected".into(),
            status_kind: StatusKind::Neutral,
            affordance: Affordance::Connect,
            log: LogBuffer::new(log_capacity),
            log_scroll: 0,
            ticks_since_reading: None,
        }
    }

    pub fn affordance(&self) -> Affordance {
        self.affordance
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.latest.as_ref()
    }

    pub fn status(&self) -> (&str, StatusKind) {
        (&self.status, self.status_kind)
    }

    pub fn readings_seen(&self) -> u64 {
        self.readings_seen
    }

    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    /// Time since the last reading, at tick resolution.
    pub fn reading_age(&self) -> Option<Duration> {
        self.ticks_since_reading.map(|ticks| TICK_RATE * ticks)
    }

    fn push_reading(&mut self, reading: Reading) {
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(reading);
        self.latest = Some(reading);
        self.readings_seen += 1;
        self.ticks_since_reading = Some(0);
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_readouts(&self, frame: &mut Frame, area: Rect) {
        let [temp_area, hum_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(area);

        let (temp, hum) = self.latest.map_or_else(
            || (PLACEHOLDER.to_owned(), PLACEHOLDER.to_owned()),
            |r| (r.temperature_display(), r.humidity_display()),
        );
        render_readout(frame, temp_area, " Temperature ", &format!("{temp} °C"), theme::TEMPERATURE);
        render_readout(frame, hum_area, " Humidity ", &format!("{hum} %"), theme::HUMIDITY);
    }

    fn render_history(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(match self.reading_age() {
                Some(age) => format!(
                    " History ({} readings, last {}s ago) ",
                    self.readings_seen,
                    age.as_secs()
                ),
                None => format!(" History ({} readings) ", self.readings_seen),
            })
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [temp_area, hum_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(inner);

        // Newest readings on the right edge.
        let width = usize::from(temp_area.width);
        let skip = self.history.len().saturating_sub(width);
        let temps = scaled(self.history.iter().skip(skip).map(|r| r.temperature));
        let hums = scaled(self.history.iter().skip(skip).map(|r| r.humidity));

        frame.render_widget(
            Sparkline::default()
                .data(&temps)
                .style(Style::default().fg(theme::TEMPERATURE)),
            temp_area,
        );
        frame.render_widget(
            Sparkline::default()
                .data(&hums)
                .style(Style::default().fg(theme::HUMIDITY)),
            hum_area,
        );
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Connection ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let button = format!(" [c] {} ", self.affordance.label());
        let button_width = u16::try_from(button.chars().count()).unwrap_or(u16::MAX);
        let [status_area, button_area] =
            Layout::horizontal([Constraint::Min(1), Constraint::Length(button_width)])
                .areas(inner);

        let status = Line::from(vec![
            Span::raw(" "),
            status_indicator::status_span(self.status_kind, self.affordance),
            Span::raw(" "),
            Span::styled(
                self.status.clone(),
                status_indicator::status_style(self.status_kind),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), status_area);
        frame.render_widget(
            Paragraph::new(Span::styled(button, theme::button(self.affordance.enabled()))),
            button_area,
        );
    }

    fn render_log(&self, frame: &mut Frame, area: Rect) {
        let title = if self.log_scroll > 0 {
            format!(" Log ({}, scrolled {}) ", self.log.len(), self.log_scroll)
        } else {
            format!(" Log ({}) ", self.log.len())
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let visible = usize::from(inner.height);
        let end = self.log.len().saturating_sub(self.log_scroll);
        let start = end.saturating_sub(visible);

        let lines: Vec<Line> = self
            .log
            .iter()
            .skip(start)
            .take(end - start)
            .map(|entry| {
                Line::from(vec![
                    Span::styled(format!("[{}] ", entry.time_label()), theme::log_time()),
                    Span::styled(entry.message.clone(), theme::log_text()),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn render_readout(frame: &mut Frame, area: Rect, title: &str, value: &str, color: Color) {
    let block = Block::default()
        .title(title.to_owned())
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_default());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Vertically center the single line.
    let offset = inner.height.saturating_sub(1) / 2;
    let line_area = Rect::new(inner.x, inner.y + offset, inner.width, 1.min(inner.height));
    frame.render_widget(
        Paragraph::new(Span::styled(value.to_owned(), theme::readout(color)))
            .alignment(Alignment::Center),
        line_area,
    );
}

/// Map values onto sparkline bar heights relative to the window minimum,
/// in tenths so one decimal of change is visible.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn scaled(values: impl Iterator<Item = f64> + Clone) -> Vec<u64> {
    let min = values.clone().fold(f64::INFINITY, f64::min);
    values
        .map(|v| ((v - min) * 10.0).round().max(0.0) as u64 + 1)
        .collect()
}

impl Component for MonitorView {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Up | KeyCode::Char('k')) => Some(Action::ScrollLogUp),
            (KeyModifiers::NONE, KeyCode::Down | KeyCode::Char('j')) => {
                Some(Action::ScrollLogDown)
            }
            (KeyModifiers::NONE, KeyCode::End) | (KeyModifiers::SHIFT, KeyCode::Char('G')) => {
                Some(Action::ScrollLogToBottom)
            }
            (KeyModifiers::NONE, KeyCode::Char('x')) => Some(Action::ClearLog),
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Reading(reading) => self.push_reading(*reading),
            Action::Status { text, kind } => {
                self.status.clone_from(text);
                self.status_kind = *kind;
            }
            Action::Log(entry) => self.log.push(entry.clone()),
            Action::Affordance(affordance) => self.affordance = *affordance,
            Action::ClearLog => {
                self.log.clear();
                self.log_scroll = 0;
            }
            Action::ScrollLogUp => {
                self.log_scroll = (self.log_scroll + 1).min(self.log.len().saturating_sub(1));
            }
            Action::ScrollLogDown => self.log_scroll = self.log_scroll.saturating_sub(1),
            Action::ScrollLogToBottom => self.log_scroll = 0,
            Action::Tick => {
                if let Some(ticks) = self.ticks_since_reading.as_mut() {
                    *ticks = ticks.saturating_add(1);
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [readouts, history, status, log] = Layout::vertical([
            Constraint::Length(5),
            Constraint::Length(7),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .areas(area);

        self.render_readouts(frame, readouts);
        self.render_history(frame, history);
        self.render_status(frame, status);
        self.render_log(frame, log);
    }
}
