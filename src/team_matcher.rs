use strsim::normalized_damerau_levenshtein;

use crate::normalization::{is_stopword, normalize, tokenize};
use crate::shared_types::{CandidateMatch, LiveMatch};

/// Matcher thresholds. These are empirically chosen constants; they are
/// configuration, not derived values.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Stronger of the two asymmetric fuzzy-ratio thresholds.
    pub fuzzy_strong: f64,
    /// Weaker of the two asymmetric fuzzy-ratio thresholds.
    pub fuzzy_weak: f64,
    /// Minimum shared tokens when both names are multi-word.
    pub min_shared_tokens: usize,
    /// Cleaned-length bounds for a name to be treated as an acronym.
    pub acronym_min_len: usize,
    pub acronym_max_len: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            fuzzy_strong: 0.72,
            fuzzy_weak: 0.60,
            min_shared_tokens: 2,
            acronym_min_len: 2,
            acronym_max_len: 6,
        }
    }
}

/// Tier 1: token-set comparison. Equal or subset sets match outright;
/// otherwise the intersection must reach `min_shared_tokens`, relaxed to 1
/// when either name reduces to a single token.
fn token_sets_match(name_a: &str, name_b: &str, config: &MatcherConfig) -> bool {
    let tokens_a = tokenize(name_a);
    let tokens_b = tokenize(name_b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return false;
    }
    if tokens_a.is_subset(&tokens_b) || tokens_b.is_subset(&tokens_a) {
        return true;
    }
    let shared = tokens_a.intersection(&tokens_b).count();
    let required = if tokens_a.len() == 1 || tokens_b.len() == 1 {
        1
    } else {
        config.min_shared_tokens
    };
    shared >= required
}

/// Tier 2: treat the shorter name as a possible acronym of the longer one.
/// The candidate acronym is built from the first letter of each non-stopword
/// token (>= 3 chars) of the longer name, in order.
fn acronym_matches(name_a: &str, name_b: &str, config: &MatcherConfig) -> bool {
    let compact_a = normalize(name_a).replace(' ', "");
    let compact_b = normalize(name_b).replace(' ', "");
    let (short, long_raw) = if compact_a.len() <= compact_b.len() {
        (compact_a, name_b)
    } else {
        (compact_b, name_a)
    };
    if short.len() < config.acronym_min_len || short.len() > config.acronym_max_len {
        return false;
    }
    let acronym: String = normalize(long_raw)
        .split_whitespace()
        .filter(|t| !is_stopword(t) && t.len() >= 3)
        .filter_map(|t| t.chars().next())
        .collect();
    if acronym.len() < short.len() {
        return false;
    }
    acronym.starts_with(&short)
}

/// Per-slot match: token tier first, then the acronym fallback. The fuzzy
/// tier spans both slots and lives in `fixture_matches`.
pub fn teams_match(name_a: &str, name_b: &str, config: &MatcherConfig) -> bool {
    token_sets_match(name_a, name_b, config) || acronym_matches(name_a, name_b, config)
}

/// Tier 3 gate: asymmetric thresholds because home/away name noise differs
/// in practice.
fn fuzzy_gate(ratio_home: f64, ratio_away: f64, config: &MatcherConfig) -> bool {
    (ratio_home >= config.fuzzy_strong && ratio_away >= config.fuzzy_weak)
        || (ratio_home >= config.fuzzy_weak && ratio_away >= config.fuzzy_strong)
}

/// Decides whether a candidate and a live fixture denote the same match.
/// Both slots must pass tiers 1-2; failing that, the joint fuzzy tier runs
/// on the normalized full names.
pub fn fixture_matches(candidate: &CandidateMatch, live: &LiveMatch, config: &MatcherConfig) -> bool {
    if teams_match(&candidate.home, &live.home, config)
        && teams_match(&candidate.away, &live.away, config)
    {
        return true;
    }
    let ratio_home =
        normalized_damerau_levenshtein(&normalize(&candidate.home), &normalize(&live.home));
    let ratio_away =
        normalized_damerau_levenshtein(&normalize(&candidate.away), &normalize(&live.away));
    fuzzy_gate(ratio_home, ratio_away, config)
}
