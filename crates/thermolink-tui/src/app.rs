//! Application core: event loop, key handling, action dispatch.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use thermolink_core::{SessionCommand, SessionHandle};

use crate::action::Action;
use crate::component::Component;
use crate::event::{Event, EventReader, FRAME_RATE, TICK_RATE};
use crate::monitor::MonitorView;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::status_indicator;

/// Top-level application state and event loop.
pub struct App {
    session: SessionHandle,
    monitor: MonitorView,
    running: bool,
    help_visible: bool,
    terminal_size: (u16, u16),
    /// Action sender, shared with the session bridge.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver, drained by the main loop.
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(
        session: SessionHandle,
        action_tx: mpsc::UnboundedSender<Action>,
        action_rx: mpsc::UnboundedReceiver<Action>,
        log_capacity: usize,
    ) -> Self {
        Self {
            session,
            monitor: MonitorView::new(log_capacity),
            running: true,
            help_visible: false,
            terminal_size: (0, 0),
            action_tx,
            action_rx,
        }
    }

    /// Queue a connect/disconnect toggle, as if the user pressed `c`.
    pub fn request_toggle(&self) {
        let _ = self.action_tx.send(Action::ToggleConnection);
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.terminal_size = tui.size().unwrap_or((80, 24));

        let mut events = EventReader::new(TICK_RATE, FRAME_RATE);

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            // Drain everything queued, including session updates.
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here; the rest
    /// go to the monitor view.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.help_visible {
            return Ok(match (key.modifiers, key.code) {
                (KeyModifiers::CONTROL, KeyCode::Char('c'))
                | (KeyModifiers::NONE, KeyCode::Char('q')) => Some(Action::Quit),
                (_, KeyCode::Esc | KeyCode::Char('?')) => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c'))
            | (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),

            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),

            (KeyModifiers::NONE, KeyCode::Char('c') | KeyCode::Enter) => {
                return Ok(Some(Action::ToggleConnection));
            }

            _ => {}
        }

        self.monitor.handle_key_event(key)
    }

    /// Process a single action: update app state and propagate to the view.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Resize(w, h) => self.terminal_size = (*w, *h),

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::ToggleConnection => self.toggle_connection(),

            Action::Render => {}

            other => {
                if let Some(follow_up) = self.monitor.update(other)? {
                    self.action_tx.send(follow_up)?;
                }
            }
        }
        Ok(())
    }

    fn toggle_connection(&self) {
        if !self.monitor.affordance().enabled() {
            debug!("connect already in progress, ignoring toggle");
            return;
        }
        if let Err(e) = self.session.try_send(SessionCommand::Toggle) {
            warn!(error = %e, "could not reach session");
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let [content, status_bar] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

        self.monitor.render(frame, content);
        self.render_status_bar(frame, status_bar);

        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let (status, kind) = self.monitor.status();
        let mut spans = vec![
            Span::raw(" "),
            status_indicator::status_span(kind, self.monitor.affordance()),
            Span::styled(
                format!(" {status}"),
                status_indicator::status_style(kind),
            ),
            Span::styled(" │ ", theme::key_hint()),
        ];
        for (key, label) in [("c", "connect"), ("↑↓", "log"), ("?", "help"), ("q", "quit")] {
            spans.push(Span::styled(key, theme::key_hint_key()));
            spans.push(Span::styled(format!(" {label}  "), theme::key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help_width = 48u16.min(area.width.saturating_sub(4));
        let help_height = 13u16.min(area.height.saturating_sub(2));

        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        frame.render_widget(Clear, help_area);
        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let row = |key: &'static str, desc: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(desc, theme::log_text()),
            ])
        };
        let help_text = vec![
            Line::from(""),
            row("c, Enter", "Connect / disconnect"),
            row("↑ / k", "Scroll log up"),
            row("↓ / j", "Scroll log down"),
            row("End / G", "Jump to newest log line"),
            row("x", "Clear log"),
            row("?", "Toggle this help"),
            row("q, Ctrl-C", "Quit"),
        ];
        frame.render_widget(Paragraph::new(help_text), inner);
    }
}
