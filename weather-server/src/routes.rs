//! HTTP surface: `GET /weather/?lat=..&lon=..`.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use tokio::net::TcpListener;
use tracing::{error, info};
use weather_core::{WeatherSource, WeatherSummary};

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn WeatherSource>,
}

/// First value for `key`, or an empty string. Repeated keys are not an error.
fn first_param<'a>(params: &'a [(String, String)], key: &str) -> &'a str {
    params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str()).unwrap_or_default()
}

pub fn router(source: Arc<dyn WeatherSource>) -> Router {
    Router::new()
        .route("/weather", get(weather_handler))
        .route("/weather/", get(weather_handler))
        .with_state(AppState { source })
}

pub async fn serve(addr: &str, source: Arc<dyn WeatherSource>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(source))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// GET /weather/: fetch upstream data and reply with the simplified summary.
pub async fn weather_handler(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<WeatherSummary>, (StatusCode, String)> {
    // Coordinates are forwarded upstream without parsing.
    let lat = first_param(&params, "lat");
    let lon = first_param(&params, "lon");

    match state.source.fetch_weather(lat, lon).await {
        Ok(data) => Ok(Json(WeatherSummary::from(data))),
        Err(e) => {
            let msg = format!("Failed to retrieve weather data: {e}");
            error!("{msg}");
            Err((StatusCode::INTERNAL_SERVER_ERROR, msg))
        }
    }
}
