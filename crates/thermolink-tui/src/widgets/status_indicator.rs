//! Connection status indicator: ●/○/◐ with color mapping.

use ratatui::style::Style;
use ratatui::text::Span;
use thermolink_core::{Affordance, StatusKind};

use crate::theme;

/// Styled status dot. A pending connect shows as half-filled regardless of
/// the status kind.
pub fn status_span(kind: StatusKind, affordance: Affordance) -> Span<'static> {
    let (symbol, color) = match (affordance, kind) {
        (Affordance::Busy, _) => ("◐", theme::ELECTRIC_YELLOW),
        (_, StatusKind::Ok) => ("●", theme::SUCCESS_GREEN),
        (_, StatusKind::Error) => ("○", theme::ERROR_RED),
        (_, StatusKind::Neutral) => ("○", theme::DIM_WHITE),
    };
    Span::styled(symbol, Style::default().fg(color))
}

/// Color for status text of the given kind.
pub fn status_style(kind: StatusKind) -> Style {
    let color = match kind {
        StatusKind::Ok => theme::SUCCESS_GREEN,
        StatusKind::Error => theme::ERROR_RED,
        StatusKind::Neutral => theme::DIM_WHITE,
    };
    Style::default().fg(color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn busy_overrides_kind() {
        let span = status_span(StatusKind::Error, Affordance::Busy);
        assert_eq!(span.content, "◐");
    }

    #[test]
    fn connected_is_filled_green() {
        let span = status_span(StatusKind::Ok, Affordance::Disconnect);
        assert_eq!(span.content, "●");
        assert_eq!(span.style.fg, Some(theme::SUCCESS_GREEN));
    }
}
