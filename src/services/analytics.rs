use std::fmt;

use log::debug;

pub const ANALYTICS_TARGET: &str = "and_one::analytics";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsEvent {
    CourtAdd,
    PlayerAdd,
    GameCreate,
    GameJoin,
    GameLeave,
    GameFull,
    SeedDone,
}

impl AnalyticsEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AnalyticsEvent::CourtAdd => "courtAdd",
            AnalyticsEvent::PlayerAdd => "playerAdd",
            AnalyticsEvent::GameCreate => "gameCreate",
            AnalyticsEvent::GameJoin => "gameJoin",
            AnalyticsEvent::GameLeave => "gameLeave",
            AnalyticsEvent::GameFull => "gameFull",
            AnalyticsEvent::SeedDone => "seedDone",
        }
    }
}

impl fmt::Display for AnalyticsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Emit a usage event as a debug record. Enable with
/// `RUST_LOG=and_one::analytics=debug`.
pub fn track(event: AnalyticsEvent, meta: &[(&str, String)]) {
    debug!(target: ANALYTICS_TARGET, "{} {}", event, format_meta(meta));
}

fn format_meta(meta: &[(&str, String)]) -> String {
    meta.iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}
