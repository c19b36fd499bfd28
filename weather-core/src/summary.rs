//! Translation of the provider payload into the public summary schema.

use serde::{Deserialize, Serialize};

use crate::model::UpstreamWeatherResponse;

/// Feels-like values below this are "cold".
pub const MODERATE_FROM_F: f64 = 65.0;
/// Feels-like values at or above this are "hot".
pub const HOT_FROM_F: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureBucket {
    Cold,
    Moderate,
    Hot,
}

impl TemperatureBucket {
    /// Classify a feels-like temperature (Fahrenheit) using half-open intervals.
    ///
    /// Boundary values belong to the upper bucket. NaN fails every comparison
    /// and lands in `Hot`.
    pub fn from_feels_like(degrees: f64) -> Self {
        if degrees < MODERATE_FROM_F {
            TemperatureBucket::Cold
        } else if degrees < HOT_FROM_F {
            TemperatureBucket::Moderate
        } else {
            TemperatureBucket::Hot
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureBucket::Cold => "cold",
            TemperatureBucket::Moderate => "moderate",
            TemperatureBucket::Hot => "hot",
        }
    }
}

impl std::fmt::Display for TemperatureBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The simplified response returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    pub alerts: Vec<String>,
    pub conditions: Vec<String>,
    pub temperature: TemperatureBucket,
}

impl From<UpstreamWeatherResponse> for WeatherSummary {
    fn from(data: UpstreamWeatherResponse) -> Self {
        let conditions = data.current.weather.into_iter().map(|cond| cond.description).collect();

        let alerts = data.alerts.into_iter().map(|alert| alert.event).collect();

        Self {
            alerts,
            conditions,
            temperature: TemperatureBucket::from_feels_like(data.current.feels_like),
        }
    }
}
