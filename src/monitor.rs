use std::collections::{HashMap, HashSet};
use std::time::Instant;

use chrono::Utc;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::candidate_filter::filter_candidates;
use crate::config::Settings;
use crate::error::BotError;
use crate::halftime::is_halftime_scoreless;
use crate::live_fetcher::LiveSource;
use crate::normalization::normalize;
use crate::notifier::{format_alert, format_shutdown, format_startup, Notifier};
use crate::shared_types::{CandidateKey, CandidateMatch, LiveMatch, MatchIdentity};
use crate::stats_fetcher::CandidateSource;
use crate::team_matcher::fixture_matches;

/// The orchestration loop. Owns the cached candidate map and the dedup
/// ledger; nothing else touches them, so no locking is needed.
pub struct Monitor {
    settings: Settings,
    candidate_source: Box<dyn CandidateSource>,
    live_source: Box<dyn LiveSource>,
    notifier: Box<dyn Notifier>,
    candidates: HashMap<CandidateKey, CandidateMatch>,
    notified: HashSet<MatchIdentity>,
    last_refresh: Option<Instant>,
}

impl Monitor {
    pub fn new(
        settings: Settings,
        candidate_source: Box<dyn CandidateSource>,
        live_source: Box<dyn LiveSource>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            settings,
            candidate_source,
            live_source,
            notifier,
            candidates: HashMap::new(),
            notified: HashSet::new(),
            last_refresh: None,
        }
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Clears the candidate cache, the dedup ledger and the refresh clock.
    pub fn reset_state(&mut self) {
        self.candidates.clear();
        self.notified.clear();
        self.last_refresh = None;
    }

    fn needs_refresh(&self) -> bool {
        self.last_refresh
            .map_or(true, |t| t.elapsed() >= self.settings.refresh_interval)
    }

    /// Re-pulls and re-filters the candidate set, replacing it wholesale.
    /// On failure the previous set is retained and the refresh is retried
    /// on the next tick.
    async fn refresh_candidates(&mut self) {
        let today = Utc::now().date_naive();
        match self.candidate_source.fetch_fixtures(today).await {
            Ok(fixtures) => {
                self.candidates = filter_candidates(
                    &fixtures,
                    self.settings.avg_threshold,
                    &self.settings.exclusion_keywords,
                );
                self.last_refresh = Some(Instant::now());
                info!(
                    fixtures = fixtures.len(),
                    candidates = self.candidates.len(),
                    "candidate set refreshed"
                );
            }
            Err(e) => {
                warn!(error = %e, "candidate refresh failed, keeping previous set");
            }
        }
    }

    /// Resolves a live match against the candidate set: keyed lookup first,
    /// then the full matcher scan.
    fn correlate(&self, live: &LiveMatch) -> Option<&CandidateMatch> {
        let key = (normalize(&live.home), normalize(&live.away));
        if let Some(candidate) = self.candidates.get(&key) {
            return Some(candidate);
        }
        self.candidates
            .values()
            .find(|c| fixture_matches(c, live, &self.settings.matcher))
    }

    /// One poll cycle. Returns the number of notifications sent.
    pub async fn tick(&mut self) -> Result<usize, BotError> {
        if self.needs_refresh() {
            self.refresh_candidates().await;
        }
        if self.candidates.is_empty() {
            info!("no candidates to watch this tick");
            return Ok(0);
        }

        let live = self.live_source.fetch_live().await?;
        info!(live = live.len(), "live matches fetched");

        let mut sent = 0;
        for live_match in &live {
            if !live_match.in_play {
                continue;
            }
            let candidate = match self.correlate(live_match) {
                Some(c) => c.clone(),
                None => continue,
            };
            if !is_halftime_scoreless(live_match, &self.settings.halftime) {
                continue;
            }
            let identity = MatchIdentity::of(live_match);
            if self.notified.contains(&identity) {
                continue;
            }
            let text = format_alert(&candidate, live_match);
            match self.notifier.send(&text).await {
                Ok(()) => {
                    // Only a delivered alert enters the ledger; a failed one
                    // is retried while the match is still observed at HT 0-0.
                    self.notified.insert(identity);
                    sent += 1;
                    info!(home = %live_match.home, away = %live_match.away, "notification sent");
                }
                Err(e) => {
                    warn!(error = %e, home = %live_match.home, "delivery failed, will retry");
                }
            }
        }
        Ok(sent)
    }

    /// Runs until ctrl-c. Upstream failures never terminate the loop; a
    /// failed tick is followed by the backoff interval instead of the poll
    /// interval. Cancellation is checked between ticks only.
    pub async fn run(&mut self) {
        if let Err(e) = self.notifier.send(&format_startup(&self.settings)).await {
            warn!(error = %e, "startup notification failed");
        }
        loop {
            let delay = match self.tick().await {
                Ok(sent) => {
                    info!(sent, "tick complete");
                    self.settings.poll_interval
                }
                Err(e) => {
                    error!(error = %e, "tick failed, backing off");
                    self.settings.error_backoff
                }
            };
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("cancellation requested");
                    break;
                }
                _ = sleep(delay) => {}
            }
        }
        if let Err(e) = self.notifier.send(&format_shutdown()).await {
            warn!(error = %e, "shutdown notification failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::halftime::HalftimeWindow;
    use crate::shared_types::FixtureRecord;
    use crate::team_matcher::MatcherConfig;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn test_settings() -> Settings {
        Settings {
            avg_threshold: 2.7,
            poll_interval: Duration::from_secs(180),
            refresh_interval: Duration::from_secs(1800),
            error_backoff: Duration::from_secs(60),
            exclusion_keywords: vec!["esoccer".to_string()],
            matcher: MatcherConfig::default(),
            halftime: HalftimeWindow::default(),
            footystats_api_key: None,
            footystats_base_url: String::new(),
            candidate_csv: None,
            rapidapi_key: String::new(),
            rapidapi_host: String::new(),
            telegram_token: String::new(),
            telegram_chat_id: String::new(),
        }
    }

    fn fixture(home: &str, away: &str, avg: f64) -> FixtureRecord {
        FixtureRecord {
            home: home.to_string(),
            away: away.to_string(),
            league: "Primeira Liga".to_string(),
            country: "Portugal".to_string(),
            avg_goals_both: avg,
            avg_goals_home: 0.0,
            avg_goals_away: 0.0,
        }
    }

    fn live(home: &str, away: &str, minute: u32, home_score: u32, away_score: u32) -> LiveMatch {
        LiveMatch {
            home: home.to_string(),
            away: away.to_string(),
            home_score,
            away_score,
            minute: Some(minute),
            league: "Primeira Liga".to_string(),
            in_play: true,
        }
    }

    struct StaticCandidates(Vec<FixtureRecord>);

    #[async_trait]
    impl CandidateSource for StaticCandidates {
        async fn fetch_fixtures(&self, _date: NaiveDate) -> Result<Vec<FixtureRecord>, BotError> {
            Ok(self.0.clone())
        }
    }

    struct FailingCandidates;

    #[async_trait]
    impl CandidateSource for FailingCandidates {
        async fn fetch_fixtures(&self, _date: NaiveDate) -> Result<Vec<FixtureRecord>, BotError> {
            Err(BotError::UpstreamStatus(reqwest::StatusCode::BAD_GATEWAY))
        }
    }

    struct StaticLive(Vec<LiveMatch>);

    #[async_trait]
    impl LiveSource for StaticLive {
        async fn fetch_live(&self) -> Result<Vec<LiveMatch>, BotError> {
            Ok(self.0.clone())
        }
    }

    struct FailingLive;

    #[async_trait]
    impl LiveSource for FailingLive {
        async fn fetch_live(&self) -> Result<Vec<LiveMatch>, BotError> {
            Err(BotError::UpstreamStatus(reqwest::StatusCode::SERVICE_UNAVAILABLE))
        }
    }

    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<String>>>,
        failures_left: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> Result<(), BotError> {
            if self.failures_left.load(Ordering::SeqCst) > 0 {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
                return Err(BotError::Delivery("telegram returned 502".to_string()));
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn recording_notifier(failures: usize) -> (Box<RecordingNotifier>, Arc<Mutex<Vec<String>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let notifier = RecordingNotifier {
            sent: sent.clone(),
            failures_left: Arc::new(AtomicUsize::new(failures)),
        };
        (Box::new(notifier), sent)
    }

    fn monitor_with(
        fixtures: Vec<FixtureRecord>,
        lives: Vec<LiveMatch>,
        failures: usize,
    ) -> (Monitor, Arc<Mutex<Vec<String>>>) {
        let (notifier, sent) = recording_notifier(failures);
        let monitor = Monitor::new(
            test_settings(),
            Box::new(StaticCandidates(fixtures)),
            Box::new(StaticLive(lives)),
            notifier,
        );
        (monitor, sent)
    }

    #[tokio::test]
    async fn test_end_to_end_alert() {
        let (mut monitor, sent) = monitor_with(
            vec![fixture("FC Porto", "Benfica", 3.1)],
            vec![live("Porto", "SL Benfica", 45, 0, 0)],
            0,
        );
        assert_eq!(monitor.tick().await.unwrap(), 1);
        let messages = sent.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Porto"));
        assert!(messages[0].contains("SL Benfica"));
        assert!(messages[0].contains("3.10"));
    }

    #[tokio::test]
    async fn test_no_alert_outside_halftime_window() {
        let (mut monitor, sent) = monitor_with(
            vec![fixture("FC Porto", "Benfica", 3.1)],
            vec![live("Porto", "SL Benfica", 52, 0, 0)],
            0,
        );
        assert_eq!(monitor.tick().await.unwrap(), 0);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_alert_without_candidate() {
        let (mut monitor, sent) = monitor_with(
            vec![fixture("FC Porto", "Benfica", 3.1)],
            vec![live("Arsenal", "Chelsea", 45, 0, 0)],
            0,
        );
        assert_eq!(monitor.tick().await.unwrap(), 0);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_alert_when_goal_scored() {
        let (mut monitor, sent) = monitor_with(
            vec![fixture("FC Porto", "Benfica", 3.1)],
            vec![live("Porto", "SL Benfica", 45, 1, 0)],
            0,
        );
        assert_eq!(monitor.tick().await.unwrap(), 0);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dedup_across_ticks() {
        let (mut monitor, sent) = monitor_with(
            vec![fixture("FC Porto", "Benfica", 3.1)],
            vec![live("Porto", "SL Benfica", 45, 0, 0)],
            0,
        );
        assert_eq!(monitor.tick().await.unwrap(), 1);
        assert_eq!(monitor.tick().await.unwrap(), 0);
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_delivery_retries_next_tick() {
        let (mut monitor, sent) = monitor_with(
            vec![fixture("FC Porto", "Benfica", 3.1)],
            vec![live("Porto", "SL Benfica", 45, 0, 0)],
            1,
        );
        // First delivery fails; the identity must not enter the ledger.
        assert_eq!(monitor.tick().await.unwrap(), 0);
        assert_eq!(monitor.tick().await.unwrap(), 1);
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_not_in_play_match_skipped() {
        let mut stale = live("Porto", "SL Benfica", 45, 0, 0);
        stale.in_play = false;
        let (mut monitor, sent) =
            monitor_with(vec![fixture("FC Porto", "Benfica", 3.1)], vec![stale], 0);
        assert_eq!(monitor.tick().await.unwrap(), 0);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_live_fetch_failure_propagates() {
        let (notifier, _sent) = recording_notifier(0);
        let mut monitor = Monitor::new(
            test_settings(),
            Box::new(StaticCandidates(vec![fixture("FC Porto", "Benfica", 3.1)])),
            Box::new(FailingLive),
            notifier,
        );
        assert!(monitor.tick().await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_failure_is_an_empty_tick() {
        let (notifier, sent) = recording_notifier(0);
        let mut monitor = Monitor::new(
            test_settings(),
            Box::new(FailingCandidates),
            Box::new(StaticLive(vec![live("Porto", "SL Benfica", 45, 0, 0)])),
            notifier,
        );
        assert_eq!(monitor.tick().await.unwrap(), 0);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_state() {
        let (mut monitor, _sent) = monitor_with(
            vec![fixture("FC Porto", "Benfica", 3.1)],
            vec![live("Porto", "SL Benfica", 45, 0, 0)],
            0,
        );
        monitor.tick().await.unwrap();
        assert_eq!(monitor.candidate_count(), 1);
        monitor.reset_state();
        assert_eq!(monitor.candidate_count(), 0);
        // Ledger cleared: the same identity notifies again.
        assert_eq!(monitor.tick().await.unwrap(), 1);
    }
}
