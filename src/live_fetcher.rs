use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::BotError;
use crate::halftime::minute_from_timer;
use crate::shared_types::LiveMatch;

/// Pull interface for the live-score source: all currently in-play fixtures.
#[async_trait]
pub trait LiveSource: Send + Sync {
    async fn fetch_live(&self) -> Result<Vec<LiveMatch>, BotError>;
}

#[derive(Deserialize, Debug)]
struct LiveResponse {
    #[serde(default)]
    result: Vec<LiveEvent>,
}

#[derive(Deserialize, Debug)]
struct LiveEvent {
    #[serde(rename = "teamA")]
    team_a: Option<LiveTeam>,
    #[serde(rename = "teamB")]
    team_b: Option<LiveTeam>,
    timer: Option<String>,
    league: Option<LiveLeague>,
    status: Option<String>,
}

#[derive(Deserialize, Debug)]
struct LiveTeam {
    name: Option<String>,
    /// The feed reports scores as numbers or digit strings depending on
    /// the competition.
    score: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
struct LiveLeague {
    name: Option<String>,
}

fn coerce_score(value: Option<&serde_json::Value>) -> Option<u32> {
    match value? {
        serde_json::Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_live_status(status: Option<&str>) -> bool {
    match status {
        Some(s) => !matches!(
            s.to_lowercase().as_str(),
            "finished" | "ended" | "ft" | "postponed" | "cancelled" | "canceled"
        ),
        None => true,
    }
}

/// Decodes the live payload; events missing names or scores are skipped and
/// processing continues for the rest of the batch.
fn parse_live_payload(body: &str) -> Result<Vec<LiveMatch>, BotError> {
    let response: LiveResponse = serde_json::from_str(body)?;
    let mut live = Vec::new();
    for event in response.result {
        let home_name = event.team_a.as_ref().and_then(|t| t.name.clone());
        let away_name = event.team_b.as_ref().and_then(|t| t.name.clone());
        let home_score = coerce_score(event.team_a.as_ref().and_then(|t| t.score.as_ref()));
        let away_score = coerce_score(event.team_b.as_ref().and_then(|t| t.score.as_ref()));
        let (home, away, home_score, away_score) =
            match (home_name, away_name, home_score, away_score) {
                (Some(h), Some(a), Some(hs), Some(aws)) if !h.is_empty() && !a.is_empty() => {
                    (h, a, hs, aws)
                }
                _ => {
                    debug!("skipping live event with missing fields");
                    continue;
                }
            };
        live.push(LiveMatch {
            home: home.trim().to_string(),
            away: away.trim().to_string(),
            home_score,
            away_score,
            minute: event.timer.as_deref().and_then(minute_from_timer),
            league: event.league.and_then(|l| l.name).unwrap_or_default(),
            in_play: is_live_status(event.status.as_deref()),
        });
    }
    Ok(live)
}

/// RapidAPI-style live-score client.
pub struct SoccerInfoClient {
    client: reqwest::Client,
    api_key: String,
    host: String,
}

impl SoccerInfoClient {
    pub fn new(api_key: &str, host: &str) -> Result<Self, BotError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            host: host.to_string(),
        })
    }
}

#[async_trait]
impl LiveSource for SoccerInfoClient {
    async fn fetch_live(&self) -> Result<Vec<LiveMatch>, BotError> {
        let url = format!("https://{}/live/full/", self.host);
        let response = self
            .client
            .get(&url)
            .query(&[("i", "en_US"), ("f", "json")])
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BotError::UpstreamStatus(response.status()));
        }
        let body = response.text().await?;
        parse_live_payload(&body)
    }
}
