use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE_PARENS: Regex = Regex::new(r"\([^)]*\)").unwrap();
    static ref RE_NON_ALNUM: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
    /// Generic club-type abbreviations and age/gender/reserve-squad
    /// qualifiers that carry no identity.
    static ref STOPWORDS: HashSet<&'static str> = [
        "fc", "cf", "sc", "ac", "afc", "cd", "club",
        "u19", "u20", "u21", "u23",
        "b", "ii", "iii", "reserves", "women",
    ]
    .iter()
    .copied()
    .collect();
}

/// Canonicalizes a raw team name into a comparable form: accent-stripped,
/// lowercased, parentheticals removed, punctuation collapsed to single
/// spaces. Total and idempotent; empty input yields an empty string.
pub fn normalize(raw: &str) -> String {
    let decomposed: String = raw.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let lower = decomposed.to_lowercase();
    let no_parens = RE_PARENS.replace_all(&lower, " ");
    let no_apostrophes = no_parens.replace(['\'', '`', '\u{2019}'], "");
    let spaced = RE_NON_ALNUM.replace_all(&no_apostrophes, " ");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Token set for set-overlap comparison: normalized words minus stopwords
/// and short tokens. Purely numeric tokens are kept regardless of length
/// (preserves founding-year names like "1899").
pub fn tokenize(raw: &str) -> HashSet<String> {
    normalize(raw)
        .split_whitespace()
        .filter(|t| !STOPWORDS.contains(*t))
        .filter(|t| t.len() >= 3 || t.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}
