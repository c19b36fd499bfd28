use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::{
    config::ServiceConfig,
    model::UpstreamWeatherResponse,
    provider::{SourceError, WeatherSource},
};

const ONECALL_PATH: &str = "/data/2.5/onecall";
// all we need is 'current' and 'alerts'
const EXCLUDE: &str = "minutely,hourly,daily";
const UNITS: &str = "imperial";

/// Client for the OpenWeatherMap "One Call" endpoint.
///
/// Holds one pooled `reqwest::Client`; clone it freely and share it across requests.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    endpoint: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key: config.api_key.clone(),
            endpoint: format!("{}{ONECALL_PATH}", config.base_url.trim_end_matches('/')),
            http,
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch_weather(
        &self,
        lat: &str,
        lon: &str,
    ) -> Result<UpstreamWeatherResponse, SourceError> {
        debug!(lat, lon, "Requesting OpenWeather one call data");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("lat", lat),
                ("lon", lon),
                ("exclude", EXCLUDE),
                ("appid", self.api_key.as_str()),
                ("units", UNITS),
            ])
            .send()
            .await
            .map_err(SourceError::network)?;

        let status = res.status();
        // Read the whole body so the pooled connection is released on every path.
        let body = res.bytes().await.map_err(SourceError::network)?;

        let parsed: UpstreamWeatherResponse = serde_json::from_slice(&body).map_err(|err| {
            warn!(
                "Failed to parse OpenWeather response (status {status}): {}",
                truncate_body(&body)
            );
            SourceError::from(err)
        })?;

        if status != StatusCode::OK {
            debug!(%status, "OpenWeather reported an error");
            return Err(SourceError::Upstream { message: parsed.message.unwrap_or_default() });
        }

        Ok(parsed)
    }
}

fn truncate_body(body: &[u8]) -> String {
    const MAX: usize = 200;
    let text = String::from_utf8_lossy(body);
    if text.chars().count() > MAX {
        format!("{}...", text.chars().take(MAX).collect::<String>())
    } else {
        text.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    fn client_for(server: &MockServer) -> OpenWeatherClient {
        let config = ServiceConfig { base_url: server.uri(), ..ServiceConfig::new("TEST_KEY") };
        OpenWeatherClient::new(&config).expect("client builds")
    }

    #[tokio::test]
    async fn sends_fixed_query_and_decodes_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/onecall"))
            .and(query_param("lat", "30.489772"))
            .and(query_param("lon", "-99.771335"))
            .and(query_param("exclude", "minutely,hourly,daily"))
            .and(query_param("appid", "TEST_KEY"))
            .and(query_param("units", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current": {
                    "feels_like": 72.0,
                    "weather": [{"description": "overcast clouds"}]
                },
                "alerts": [{"event": "Flood Watch"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let data = client_for(&server)
            .fetch_weather("30.489772", "-99.771335")
            .await
            .expect("200 with valid body");

        assert_eq!(data.current.feels_like, 72.0);
        assert_eq!(data.current.weather[0].description, "overcast clouds");
        assert_eq!(data.alerts[0].event, "Flood Watch");
    }

    #[tokio::test]
    async fn forwards_coordinates_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("lat", "not-a-number"))
            .and(query_param("lon", ""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).fetch_weather("not-a-number", "").await.expect("forwarded upstream");
    }

    #[tokio::test]
    async fn non_200_with_message_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"cod": 401, "message": "invalid API key"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_weather("1", "2").await.unwrap_err();

        assert!(matches!(err, SourceError::Upstream { .. }));
        assert_eq!(err.to_string(), "Error from openweathermap service: invalid API key");
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error_even_on_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_weather("1", "2").await.unwrap_err();

        assert!(matches!(err, SourceError::Decode(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn malformed_body_on_success_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_weather("1", "2").await.unwrap_err();

        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let config =
            ServiceConfig { base_url: format!("http://{addr}"), ..ServiceConfig::new("TEST_KEY") };
        let client = OpenWeatherClient::new(&config).unwrap();

        let err = client.fetch_weather("1", "2").await.unwrap_err();

        assert!(matches!(err, SourceError::Network(_)), "got {err:?}");
        assert!(!err.to_string().contains("TEST_KEY"), "api key leaked: {err}");
    }

    #[tokio::test]
    async fn slow_upstream_hits_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let config = ServiceConfig {
            base_url: server.uri(),
            timeout: Duration::from_millis(200),
            ..ServiceConfig::new("TEST_KEY")
        };
        let client = OpenWeatherClient::new(&config).unwrap();

        let err = client.fetch_weather("1", "2").await.unwrap_err();

        assert!(matches!(err, SourceError::Network(_)), "got {err:?}");
    }

    #[test]
    fn truncate_body_limits_length() {
        let long = "x".repeat(500);
        let truncated = truncate_body(long.as_bytes());

        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_body(b"short"), "short");
    }
}
