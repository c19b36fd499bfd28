//! Core library for the weather summary gateway.
//!
//! This crate defines:
//! - Configuration layering (file, flags/environment, defaults)
//! - The `WeatherSource` abstraction and its OpenWeatherMap client
//! - The upstream payload model and the summary it is translated into
//!
//! It is used by `weather-server`, but can also be reused by other binaries or services.

pub mod config;
pub mod model;
pub mod provider;
pub mod summary;

pub use config::{Config, ServiceConfig};
pub use model::UpstreamWeatherResponse;
pub use provider::{OpenWeatherClient, SourceError, WeatherSource};
pub use summary::{TemperatureBucket, WeatherSummary};

#[cfg(any(test, feature = "mock"))]
pub use provider::MockWeatherSource;
