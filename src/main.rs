use dotenv::dotenv;
use footystats_bot::config::Settings;
use footystats_bot::live_fetcher::SoccerInfoClient;
use footystats_bot::monitor::Monitor;
use footystats_bot::notifier::TelegramNotifier;
use footystats_bot::stats_fetcher::{CandidateSource, CsvCandidateSource, FootyStatsClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env()?;
    info!(
        avg_threshold = settings.avg_threshold,
        poll_secs = settings.poll_interval.as_secs(),
        refresh_secs = settings.refresh_interval.as_secs(),
        "starting halftime-scoreless monitor"
    );

    let candidate_source: Box<dyn CandidateSource> = match &settings.candidate_csv {
        Some(location) => {
            info!(location = %location, "using csv candidate source");
            Box::new(CsvCandidateSource::new(location)?)
        }
        None => {
            let key = settings
                .footystats_api_key
                .as_deref()
                .unwrap_or_default();
            Box::new(FootyStatsClient::new(&settings.footystats_base_url, key)?)
        }
    };
    let live_source = SoccerInfoClient::new(&settings.rapidapi_key, &settings.rapidapi_host)?;
    let notifier = TelegramNotifier::new(&settings.telegram_token, &settings.telegram_chat_id)?;

    let mut monitor = Monitor::new(
        settings,
        candidate_source,
        Box::new(live_source),
        Box::new(notifier),
    );
    monitor.run().await;
    Ok(())
}
