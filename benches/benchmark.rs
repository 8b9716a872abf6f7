use footystats_bot::shared_types::{CandidateMatch, LiveMatch};
use footystats_bot::team_matcher::{fixture_matches, MatcherConfig};
use std::time::Instant;

fn candidate(home: &str, away: &str) -> CandidateMatch {
    CandidateMatch {
        home: home.to_string(),
        away: away.to_string(),
        league: "Primeira Liga".to_string(),
        country: "Portugal".to_string(),
        avg_goals: 3.1,
    }
}

fn live(home: &str, away: &str) -> LiveMatch {
    LiveMatch {
        home: home.to_string(),
        away: away.to_string(),
        home_score: 0,
        away_score: 0,
        minute: Some(45),
        league: "Primeira Liga".to_string(),
        in_play: true,
    }
}

fn main() {
    let config = MatcherConfig::default();
    let c = candidate("FC Porto", "Sporting Clube de Braga");
    let hit = live("Porto", "SC Braga");
    let miss = live("Dinamo Zagreb", "Hajduk Split");

    let start = Instant::now();
    for _ in 0..10000 {
        fixture_matches(&c, &hit, &config);
        fixture_matches(&c, &miss, &config);
    }
    let duration = start.elapsed();
    println!("Time taken: {:?}", duration);
}
