use crate::model::UpstreamWeatherResponse;
use async_trait::async_trait;
use thiserror::Error;

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Why a weather lookup failed.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The provider could not be reached, or the exchange broke off (includes timeouts).
    #[error("{0}")]
    Network(String),

    /// The provider answered with a body that is not the JSON we expect.
    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    /// The provider answered with a non-200 status and its own message.
    #[error("Error from openweathermap service: {message}")]
    Upstream { message: String },
}

impl SourceError {
    /// Flatten a transport error and its causes into one line.
    ///
    /// The request URL is stripped first: it carries the API key.
    pub fn network(err: reqwest::Error) -> Self {
        SourceError::Network(format!("{:#}", anyhow::Error::new(err.without_url())))
    }
}

/// Anything that can answer "what is the weather at these coordinates".
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Coordinates are forwarded verbatim; validation is the provider's job.
    async fn fetch_weather(
        &self,
        lat: &str,
        lon: &str,
    ) -> Result<UpstreamWeatherResponse, SourceError>;
}
