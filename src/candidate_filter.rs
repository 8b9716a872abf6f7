use std::collections::HashMap;

use tracing::debug;

use crate::normalization::normalize;
use crate::shared_types::{CandidateKey, CandidateMatch, FixtureRecord};

/// Scoring-potential metric for a fixture: the source's direct figure when
/// present, otherwise the mean of the home/away components.
pub fn average_goals(record: &FixtureRecord) -> f64 {
    if record.avg_goals_both > 0.0 {
        return record.avg_goals_both;
    }
    if record.avg_goals_home > 0.0 || record.avg_goals_away > 0.0 {
        return (record.avg_goals_home + record.avg_goals_away) / 2.0;
    }
    0.0
}

fn is_excluded(record: &FixtureRecord, exclusions: &[String]) -> bool {
    let league = record.league.to_lowercase();
    let country = record.country.to_lowercase();
    exclusions
        .iter()
        .any(|kw| league.contains(kw.as_str()) || country.contains(kw.as_str()))
}

/// Reduces the full fixture list to the high-scoring-potential set, keyed by
/// normalized team pair for O(1) lookup during correlation. The keying is an
/// optimization; correlation still falls back to the full matcher scan.
pub fn filter_candidates(
    fixtures: &[FixtureRecord],
    threshold: f64,
    exclusions: &[String],
) -> HashMap<CandidateKey, CandidateMatch> {
    let mut candidates = HashMap::new();
    for record in fixtures {
        if is_excluded(record, exclusions) {
            debug!(league = %record.league, "excluded league");
            continue;
        }
        let avg = average_goals(record);
        if avg < threshold {
            continue;
        }
        let key = (normalize(&record.home), normalize(&record.away));
        candidates.insert(
            key,
            CandidateMatch {
                home: record.home.clone(),
                away: record.away.clone(),
                league: record.league.clone(),
                country: record.country.clone(),
                avg_goals: avg,
            },
        );
    }
    candidates
}
