//! Every state transition in the TUI is expressed as an Action.

use thermolink_core::{Affordance, LogEntry, Reading, StatusKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── User intent ───────────────────────────────────────────────
    ToggleConnection,
    ToggleHelp,
    ClearLog,
    ScrollLogUp,
    ScrollLogDown,
    ScrollLogToBottom,

    // ── Session events (from the presenter bridge) ────────────────
    Reading(Reading),
    Status { text: String, kind: StatusKind },
    Log(LogEntry),
    Affordance(Affordance),
}
