use async_trait::async_trait;
use std::time::Duration;

use crate::config::Settings;
use crate::error::BotError;
use crate::shared_types::{CandidateMatch, LiveMatch};

/// Push interface for the downstream alert channel. Messages may carry a
/// light HTML markup subset (bold) and emoji.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), BotError>;
}

/// Telegram Bot API notifier (sendMessage, HTML parse mode).
pub struct TelegramNotifier {
    client: reqwest::Client,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: &str, chat_id: &str) -> Result<Self, BotError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            token: token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), BotError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "HTML",
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BotError::Delivery(format!(
                "telegram returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Alert for a newly qualifying halftime-scoreless match. Team names come
/// from the live source, the avg figure from the candidate record.
pub fn format_alert(candidate: &CandidateMatch, live: &LiveMatch) -> String {
    format!(
        "🚨 <b>OVER 1.5 FT SIGNAL</b>\n\n\
         ⚽ <b>{home} vs {away}</b>\n\
         🏆 {league}\n\
         📊 AVG: <b>{avg:.2}</b>\n\
         ⏱️ <b>HALFTIME</b> | 1H: <b>0-0</b>\n\n\
         🎯 <b>BET NOW: OVER 1.5 FT</b>",
        home = live.home,
        away = live.away,
        league = live.league,
        avg = candidate.avg_goals,
    )
}

pub fn format_startup(settings: &Settings) -> String {
    format!(
        "🤖 <b>Bot online</b>\n\n\
         📊 AVG threshold: <b>{:.2}</b>\n\
         ⏱️ Check interval: <b>{}s</b>\n\
         ✅ Watching for HT 0-0",
        settings.avg_threshold,
        settings.poll_interval.as_secs(),
    )
}

pub fn format_shutdown() -> String {
    "⛔ Bot stopped".to_string()
}
