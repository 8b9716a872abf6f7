use std::env;
use std::time::Duration;

use crate::error::BotError;
use crate::halftime::HalftimeWindow;
use crate::team_matcher::MatcherConfig;

/// Runtime settings, read from the environment once at startup. Every
/// tunable has a default; only the upstream credentials are required.
#[derive(Debug, Clone)]
pub struct Settings {
    pub avg_threshold: f64,
    pub poll_interval: Duration,
    pub refresh_interval: Duration,
    pub error_backoff: Duration,
    pub exclusion_keywords: Vec<String>,
    pub matcher: MatcherConfig,
    pub halftime: HalftimeWindow,

    pub footystats_api_key: Option<String>,
    pub footystats_base_url: String,
    /// Path or http(s) URL of a CSV candidate list; when set it replaces the
    /// statistics API as the candidate source.
    pub candidate_csv: Option<String>,

    pub rapidapi_key: String,
    pub rapidapi_host: String,

    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, BotError> {
        let candidate_csv = env::var("CANDIDATE_CSV").ok().filter(|v| !v.is_empty());
        let footystats_api_key = env::var("FOOTYSTATS_API_KEY").ok().filter(|v| !v.is_empty());
        if candidate_csv.is_none() && footystats_api_key.is_none() {
            return Err(BotError::Config(
                "either FOOTYSTATS_API_KEY or CANDIDATE_CSV must be set".to_string(),
            ));
        }

        let matcher = MatcherConfig {
            fuzzy_strong: parse_env("MATCH_FUZZY_STRONG", 0.72)?,
            fuzzy_weak: parse_env("MATCH_FUZZY_WEAK", 0.60)?,
            min_shared_tokens: parse_env("MATCH_MIN_SHARED_TOKENS", 2)?,
            ..MatcherConfig::default()
        };
        let halftime = HalftimeWindow {
            start: parse_env("HALFTIME_WINDOW_START", 44)?,
            end: parse_env("HALFTIME_WINDOW_END", 47)?,
        };

        Ok(Self {
            avg_threshold: parse_env("AVG_THRESHOLD", 2.70)?,
            poll_interval: Duration::from_secs(parse_env("CHECK_INTERVAL", 180)?),
            refresh_interval: Duration::from_secs(parse_env("CANDIDATE_REFRESH_INTERVAL", 1800)?),
            error_backoff: Duration::from_secs(parse_env("ERROR_BACKOFF", 60)?),
            exclusion_keywords: parse_csv_env(
                "LEAGUE_EXCLUSIONS",
                &["esoccer", "esports", "simulated", "srl"],
            ),
            matcher,
            halftime,
            footystats_api_key,
            footystats_base_url: env::var("FOOTYSTATS_BASE_URL")
                .unwrap_or_else(|_| "https://api.footystats.org/v2".to_string()),
            candidate_csv,
            rapidapi_key: required_env("RAPIDAPI_KEY")?,
            rapidapi_host: env::var("RAPIDAPI_HOST")
                .unwrap_or_else(|_| "soccer-football-info.p.rapidapi.com".to_string()),
            telegram_token: required_env("TELEGRAM_TOKEN")?,
            telegram_chat_id: required_env("TELEGRAM_CHAT_ID")?,
        })
    }
}

fn required_env(key: &str) -> Result<String, BotError> {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BotError::Config(format!("{key} must be set")))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, BotError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| BotError::Config(format!("invalid value for {key}: {raw}"))),
        Err(_) => Ok(default),
    }
}

/// Comma-separated list, lowercased; falls back to the defaults when the
/// variable is absent or empty.
fn parse_csv_env(key: &str, defaults: &[&str]) -> Vec<String> {
    let parsed: Vec<String> = env::var(key)
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if parsed.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_default_when_absent() {
        assert_eq!(parse_env("FOOTYSTATS_BOT_NO_SUCH_VAR", 2.70).unwrap(), 2.70);
    }

    #[test]
    fn test_parse_csv_env_defaults() {
        let parsed = parse_csv_env("FOOTYSTATS_BOT_NO_SUCH_LIST", &["esoccer", "srl"]);
        assert_eq!(parsed, vec!["esoccer".to_string(), "srl".to_string()]);
    }

    #[test]
    fn test_matcher_defaults() {
        let config = MatcherConfig::default();
        assert_eq!(config.fuzzy_strong, 0.72);
        assert_eq!(config.fuzzy_weak, 0.60);
        assert_eq!(config.min_shared_tokens, 2);
    }
}
