//! Session bridge: a [`Presenter`] that forwards everything to the app loop.
//!
//! The session task calls the presenter from its own task; each call becomes
//! an [`Action`] on the TUI's unbounded action channel. Sends after the UI
//! has shut down are dropped.

use tokio::sync::mpsc;
use tracing::trace;

use thermolink_core::{Affordance, LogEntry, Presenter, Reading, StatusKind};

use crate::action::Action;

pub struct ActionPresenter {
    tx: mpsc::UnboundedSender<Action>,
}

impl ActionPresenter {
    pub fn new(tx: mpsc::UnboundedSender<Action>) -> Self {
        Self { tx }
    }

    fn send(&self, action: Action) {
        if self.tx.send(action).is_err() {
            trace!("ui gone, dropping session update");
        }
    }
}

impl Presenter for ActionPresenter {
    fn show_reading(&mut self, reading: &Reading) {
        self.send(Action::Reading(*reading));
    }

    fn set_status(&mut self, text: &str, kind: StatusKind) {
        self.send(Action::Status {
            text: text.to_owned(),
            kind,
        });
    }

    fn append_log(&mut self, entry: LogEntry) {
        self.send(Action::Log(entry));
    }

    fn set_affordance(&mut self, affordance: Affordance) {
        self.send(Action::Affordance(affordance));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn presenter_calls_become_actions() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut presenter = ActionPresenter::new(tx);

        presenter.set_affordance(Affordance::Busy);
        presenter.set_status("Connecting...", StatusKind::Neutral);
        presenter.show_reading(&Reading::new(24.5, 60.2));

        assert_eq!(rx.try_recv().unwrap(), Action::Affordance(Affordance::Busy));
        assert_eq!(
            rx.try_recv().unwrap(),
            Action::Status {
                text: "Connecting...".into(),
                kind: StatusKind::Neutral,
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            Action::Reading(Reading::new(24.5, 60.2))
        );
    }

    #[test]
    fn closed_channel_is_not_an_error() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut presenter = ActionPresenter::new(tx);
        presenter.append_log(LogEntry::now("Serial port closed."));
    }
}
