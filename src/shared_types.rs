/// Key into the candidate map: `(normalize(home), normalize(away))`.
pub type CandidateKey = (String, String);

/// A fixture as parsed from the statistics source, before filtering.
#[derive(Debug, Clone)]
pub struct FixtureRecord {
    pub home: String,
    pub away: String,
    pub league: String,
    pub country: String,
    /// Direct average-goals figure, when the source provides one.
    pub avg_goals_both: f64,
    pub avg_goals_home: f64,
    pub avg_goals_away: f64,
}

/// A fixture that passed the scoring-potential filter.
#[derive(Debug, Clone)]
pub struct CandidateMatch {
    pub home: String,
    pub away: String,
    pub league: String,
    pub country: String,
    pub avg_goals: f64,
}

/// A currently in-play fixture from the live-score source.
/// Fetched fresh every poll tick, never cached across ticks.
#[derive(Debug, Clone)]
pub struct LiveMatch {
    pub home: String,
    pub away: String,
    pub home_score: u32,
    pub away_score: u32,
    /// Elapsed minute; `None` when the source gave no usable timer.
    pub minute: Option<u32>,
    pub league: String,
    pub in_play: bool,
}

/// Dedup key: the team pair exactly as reported by the live source.
/// Once notified an identity stays in the ledger for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchIdentity {
    pub home: String,
    pub away: String,
}

impl MatchIdentity {
    pub fn of(live: &LiveMatch) -> Self {
        Self {
            home: live.home.clone(),
            away: live.away.clone(),
        }
    }
}
