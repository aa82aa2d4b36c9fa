use bamstats_core::FormatError;
use bamstats_sampling::SamplingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("No alignment source URL has been set")]
    NoSource,

    #[error("No candidate interval is long enough to sample a window from")]
    NoWindows,

    #[error("Request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    #[error("{endpoint} responded with status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Sampling(#[from] SamplingError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
