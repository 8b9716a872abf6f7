use thiserror::Error;

/// Error type for the bot. Upstream failures are recovered at the tick
/// boundary; nothing here is fatal by design.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    UpstreamStatus(reqwest::StatusCode),

    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("notification delivery failed: {0}")]
    Delivery(String),
}
