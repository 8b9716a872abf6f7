use crate::shared_types::LiveMatch;

/// Inclusive elapsed-minute window treated as halftime. A tolerance band
/// rather than an exact signal: timer granularity and latency vary by
/// source, and an explicit halftime status flag is unreliable or absent.
#[derive(Debug, Clone)]
pub struct HalftimeWindow {
    pub start: u32,
    pub end: u32,
}

impl Default for HalftimeWindow {
    fn default() -> Self {
        Self { start: 44, end: 47 }
    }
}

/// True iff the match sits in the halftime window with neither side having
/// scored.
pub fn is_halftime_scoreless(live: &LiveMatch, window: &HalftimeWindow) -> bool {
    match live.minute {
        Some(minute) => {
            minute >= window.start
                && minute <= window.end
                && live.home_score == 0
                && live.away_score == 0
        }
        None => false,
    }
}

/// Derives the elapsed minute from a live timer value: either a bare minute
/// ("45") or an "mm:ss" string, taking the integer part before the colon.
pub fn minute_from_timer(timer: &str) -> Option<u32> {
    let minute_part = timer.split(':').next()?.trim();
    minute_part.parse().ok()
}
