use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::BotError;
use crate::shared_types::FixtureRecord;

/// Header names under which CSV exports carry the average-goals figure.
const CSV_AVG_HEADERS: [&str; 4] = ["Average Goals", "Avg Goals", "AVG", "avg_goals"];

/// Pull interface for the statistics/candidate source: the full fixture
/// list for a given date, pre-filter.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn fetch_fixtures(&self, date: NaiveDate) -> Result<Vec<FixtureRecord>, BotError>;
}

#[derive(Deserialize, Debug)]
struct ApiResponse {
    #[serde(default)]
    data: Vec<ApiFixture>,
}

#[derive(Deserialize, Debug)]
struct ApiFixture {
    #[serde(rename = "homeTeam")]
    home_team: Option<ApiName>,
    #[serde(rename = "awayTeam")]
    away_team: Option<ApiName>,
    competition: Option<ApiCompetition>,
    #[serde(default)]
    pre_match_stats: Option<ApiStats>,
}

#[derive(Deserialize, Debug)]
struct ApiName {
    name: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiCompetition {
    name: Option<String>,
    country: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct ApiStats {
    #[serde(default)]
    avg_goals_per_match_both: f64,
    #[serde(default)]
    avg_goals_per_match_home: f64,
    #[serde(default)]
    avg_goals_per_match_away: f64,
}

/// Decodes the statistics payload, skipping records that lack team names.
fn parse_stats_payload(body: &str) -> Result<Vec<FixtureRecord>, BotError> {
    let response: ApiResponse = serde_json::from_str(body)?;
    let mut fixtures = Vec::new();
    for api_fixture in response.data {
        let home = api_fixture.home_team.and_then(|t| t.name);
        let away = api_fixture.away_team.and_then(|t| t.name);
        let (home, away) = match (home, away) {
            (Some(h), Some(a)) if !h.is_empty() && !a.is_empty() => (h, a),
            _ => {
                debug!("skipping fixture with missing team names");
                continue;
            }
        };
        let (league, country) = api_fixture
            .competition
            .map(|c| (c.name.unwrap_or_default(), c.country.unwrap_or_default()))
            .unwrap_or_default();
        let stats = api_fixture.pre_match_stats.unwrap_or_default();
        fixtures.push(FixtureRecord {
            home,
            away,
            league,
            country,
            avg_goals_both: stats.avg_goals_per_match_both,
            avg_goals_home: stats.avg_goals_per_match_home,
            avg_goals_away: stats.avg_goals_per_match_away,
        });
    }
    Ok(fixtures)
}

/// FootyStats-style HTTP statistics client.
pub struct FootyStatsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FootyStatsClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, BotError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl CandidateSource for FootyStatsClient {
    async fn fetch_fixtures(&self, date: NaiveDate) -> Result<Vec<FixtureRecord>, BotError> {
        let url = format!("{}/matches", self.base_url);
        let date_str = date.format("%Y-%m-%d").to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("date", date_str.as_str()),
                ("include_stats", "true"),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BotError::UpstreamStatus(response.status()));
        }
        let body = response.text().await?;
        parse_stats_payload(&body)
    }
}

/// CSV candidate source: a local file or remote URL with equivalent columns,
/// used by deployments without statistics API access.
pub struct CsvCandidateSource {
    location: String,
    client: reqwest::Client,
}

impl CsvCandidateSource {
    pub fn new(location: &str) -> Result<Self, BotError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            location: location.to_string(),
            client,
        })
    }
}

#[async_trait]
impl CandidateSource for CsvCandidateSource {
    async fn fetch_fixtures(&self, _date: NaiveDate) -> Result<Vec<FixtureRecord>, BotError> {
        let data = if self.location.starts_with("http://") || self.location.starts_with("https://")
        {
            let response = self.client.get(&self.location).send().await?;
            if !response.status().is_success() {
                return Err(BotError::UpstreamStatus(response.status()));
            }
            response.text().await?
        } else {
            tokio::fs::read_to_string(&self.location).await?
        };
        parse_csv_records(&data)
    }
}

/// Parses a CSV export with `Home Team` / `Away Team` / `League` / `Country`
/// columns and one of several average-goals headers. Rows with missing or
/// unparseable fields are skipped.
fn parse_csv_records(data: &str) -> Result<Vec<FixtureRecord>, BotError> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let home_idx = column("Home Team");
    let away_idx = column("Away Team");
    let league_idx = column("League");
    let country_idx = column("Country");
    let avg_idx = CSV_AVG_HEADERS.iter().find_map(|&h| column(h));

    let (home_idx, away_idx, avg_idx) = match (home_idx, away_idx, avg_idx) {
        (Some(h), Some(a), Some(g)) => (h, a, g),
        _ => {
            return Err(BotError::Config(
                "csv source is missing a team-name or average-goals column".to_string(),
            ))
        }
    };

    let mut fixtures = Vec::new();
    for result in reader.records() {
        let record = result?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();
        let home = field(home_idx);
        let away = field(away_idx);
        let avg: f64 = match field(avg_idx).parse() {
            Ok(v) => v,
            Err(_) => {
                debug!(home = %home, away = %away, "skipping row with bad avg value");
                continue;
            }
        };
        if home.is_empty() || away.is_empty() {
            continue;
        }
        fixtures.push(FixtureRecord {
            home,
            away,
            league: league_idx.map(field).unwrap_or_default(),
            country: country_idx.map(field).unwrap_or_default(),
            avg_goals_both: avg,
            avg_goals_home: 0.0,
            avg_goals_away: 0.0,
        });
    }
    Ok(fixtures)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stats_payload() {
        let body = r#"{"data": [
            {"homeTeam": {"name": "FC Porto"}, "awayTeam": {"name": "Benfica"},
             "competition": {"name": "Primeira Liga", "country": "Portugal"},
             "pre_match_stats": {"avg_goals_per_match_both": 3.1}},
            {"homeTeam": {"name": "Arsenal"}, "awayTeam": {"name": "Chelsea"},
             "pre_match_stats": {"avg_goals_per_match_home": 2.8, "avg_goals_per_match_away": 2.4}}
        ]}"#;
        let fixtures = parse_stats_payload(body).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].home, "FC Porto");
        assert_eq!(fixtures[0].league, "Primeira Liga");
        assert!((fixtures[0].avg_goals_both - 3.1).abs() < 1e-9);
        assert!((fixtures[1].avg_goals_home - 2.8).abs() < 1e-9);
        assert!(fixtures[1].league.is_empty());
    }

    #[test]
    fn test_parse_stats_payload_skips_nameless_records() {
        let body = r#"{"data": [
            {"homeTeam": {"name": "FC Porto"}},
            {"homeTeam": {"name": "Arsenal"}, "awayTeam": {"name": "Chelsea"}}
        ]}"#;
        let fixtures = parse_stats_payload(body).unwrap();
        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].home, "Arsenal");
    }

    #[test]
    fn test_parse_stats_payload_rejects_garbage() {
        assert!(parse_stats_payload("not json").is_err());
    }

    #[test]
    fn test_parse_csv_records() {
        let data = "\
Home Team,Away Team,League,Country,Average Goals
FC Porto,Benfica,Primeira Liga,Portugal,3.10
Everton,Fulham,Premier League,England,not-a-number
Arsenal,Chelsea,Premier League,England,2.95
";
        let fixtures = parse_csv_records(data).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].home, "FC Porto");
        assert_eq!(fixtures[1].country, "England");
        assert!((fixtures[1].avg_goals_both - 2.95).abs() < 1e-9);
    }

    #[test]
    fn test_parse_csv_alternate_avg_header() {
        let data = "Home Team,Away Team,AVG\nFC Porto,Benfica,3.10\n";
        let fixtures = parse_csv_records(data).unwrap();
        assert_eq!(fixtures.len(), 1);
        assert!(fixtures[0].league.is_empty());
    }

    #[test]
    fn test_parse_csv_missing_columns() {
        assert!(parse_csv_records("Foo,Bar\n1,2\n").is_err());
    }
}
