use serde::{Deserialize, Deserializer};

/// Subset of the OpenWeatherMap "One Call" payload (the fields we care about).
///
/// Every field is optional on the wire: provider error bodies such as
/// `{"cod":401,"message":"invalid API key"}` still decode, leaving the
/// weather fields at their zero values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UpstreamWeatherResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub current: CurrentWeather,

    #[serde(deserialize_with = "null_items_as_default")]
    pub alerts: Vec<Alert>,

    /// Set by the provider when it answers with a non-success status.
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CurrentWeather {
    /// Apparent temperature, in degrees Fahrenheit (imperial units).
    #[serde(deserialize_with = "null_as_default")]
    pub feels_like: f64,

    #[serde(deserialize_with = "null_items_as_default")]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Condition {
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Alert {
    #[serde(deserialize_with = "null_as_default")]
    pub event: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Like `null_as_default`, but also for each element: `[null]` is one zero-value entry.
fn null_items_as_default<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items.into_iter().map(Option::unwrap_or_default).collect())
}
