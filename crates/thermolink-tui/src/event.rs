//! Terminal input and timers, merged into one stream for the app loop.
//!
//! A background task owns the crossterm `EventStream` and two intervals:
//! `Tick` ages the "last reading" label, `Render` paces redraws. Session
//! updates do not come through here; they arrive on the action channel.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Tick period. Reading age is counted in ticks.
pub const TICK_RATE: Duration = Duration::from_millis(250);

/// Redraw period (~30 FPS).
pub const FRAME_RATE: Duration = Duration::from_millis(33);

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    /// Terminal was resized to (cols, rows).
    Resize(u16, u16),
    Tick,
    Render,
}

/// Keep key presses and resizes; drop releases, repeats, focus and mouse.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Resize(cols, rows) => Some(Event::Resize(cols, rows)),
        _ => None,
    }
}

fn interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    // A stalled frame should not be followed by a burst of catch-up ticks.
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn new(tick_rate: Duration, frame_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(pump(tx, cancel.clone(), tick_rate, frame_rate));
        Self { rx, cancel }
    }

    /// Next event, or `None` once the reader task has exited.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn pump(
    tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
    tick_rate: Duration,
    frame_rate: Duration,
) {
    let mut input = EventStream::new();
    let mut ticks = interval(tick_rate);
    let mut frames = interval(frame_rate);

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => return,
            _ = ticks.tick() => Event::Tick,
            _ = frames.tick() => Event::Render,
            next = input.next() => match next {
                Some(Ok(raw)) => match translate(raw) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "terminal input error");
                    continue;
                }
                // stdin closed
                None => return,
            },
        };

        if tx.send(event).is_err() {
            return;
        }
    }
}
