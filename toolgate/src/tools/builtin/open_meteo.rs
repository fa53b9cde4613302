//! Minimal Open-Meteo client shared by the sample tools.

use crate::errors::ToolgateError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Open-Meteo endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenMeteoConfig {
    /// Geocoding search endpoint.
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    /// Forecast endpoint.
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_timeout() -> f64 {
    10.0
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            geocoding_url: default_geocoding_url(),
            forecast_url: default_forecast_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl OpenMeteoConfig {
    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Points both endpoints at another host, e.g. a local mock.
    #[must_use]
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.geocoding_url = format!("{base}/v1/search");
        self.forecast_url = format!("{base}/v1/forecast");
        self
    }

    /// Gets timeout as Duration.
    ///
    /// The timeout must be a finite, positive number of seconds.
    pub fn timeout(&self) -> Result<Duration, ToolgateError> {
        if self.timeout_seconds.is_nan() || self.timeout_seconds <= 0.0 {
            return Err(ToolgateError::config(format!(
                "open_meteo.timeout_seconds must be positive, got {}",
                self.timeout_seconds
            )));
        }
        Duration::try_from_secs_f64(self.timeout_seconds).map_err(|e| {
            ToolgateError::config(format!(
                "open_meteo.timeout_seconds is out of range ({}): {e}",
                self.timeout_seconds
            ))
        })
    }

    /// Checks the endpoints and timeout.
    pub fn validate(&self) -> Result<(), ToolgateError> {
        if self.geocoding_url.trim().is_empty() || self.forecast_url.trim().is_empty() {
            return Err(ToolgateError::config("open_meteo endpoints must not be empty"));
        }
        self.timeout().map(|_| ())
    }
}

/// A geocoded place.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Place {
    /// Display name.
    pub name: String,
    /// Country name, empty when the service omits it.
    #[serde(default)]
    pub country: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// IANA timezone name.
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Offset information for a place's timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneOffset {
    /// Seconds east of UTC.
    pub utc_offset_seconds: i32,
    /// Abbreviation such as `CEST`.
    pub abbreviation: String,
}

#[derive(Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    utc_offset_seconds: i32,
    #[serde(default)]
    timezone_abbreviation: Option<String>,
    #[serde(default)]
    current: Option<CurrentConditions>,
}

#[derive(Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
}

/// HTTP client for geocoding and current conditions.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: reqwest::Client,
    config: OpenMeteoConfig,
}

impl OpenMeteoClient {
    /// Builds a client with the configured timeout.
    pub fn new(config: OpenMeteoConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout()?)
            .user_agent(concat!("toolgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, config })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &OpenMeteoConfig {
        &self.config
    }

    /// Resolves a place name to its best match.
    pub async fn geocode(&self, name: &str) -> Result<Place> {
        let response: GeocodingResponse = self
            .client
            .get(&self.config.geocoding_url)
            .query(&[("name", name), ("count", "1"), ("language", "en"), ("format", "json")])
            .send()
            .await
            .context("Geocoding request failed")?
            .error_for_status()
            .context("Geocoding service returned non-success status")?
            .json()
            .await
            .context("Failed to parse geocoding response")?;

        response
            .results
            .into_iter()
            .next()
            .with_context(|| format!("No geocoding match for '{name}'"))
    }

    /// Fetches the current temperature at a place, in degrees Celsius.
    pub async fn current_temperature(&self, place: &Place) -> Result<f64> {
        let forecast = self.forecast(place, &[("current", "temperature_2m")]).await?;
        forecast
            .current
            .map(|current| current.temperature_2m)
            .with_context(|| format!("No current conditions for {}", place.name))
    }

    /// Fetches the UTC offset of a place's timezone.
    pub async fn zone_offset(&self, place: &Place) -> Result<ZoneOffset> {
        let timezone = place.timezone.as_deref().unwrap_or("auto");
        let forecast = self.forecast(place, &[("timezone", timezone)]).await?;
        Ok(ZoneOffset {
            utc_offset_seconds: forecast.utc_offset_seconds,
            abbreviation: forecast
                .timezone_abbreviation
                .unwrap_or_else(|| "UTC".to_string()),
        })
    }

    async fn forecast(&self, place: &Place, extra: &[(&str, &str)]) -> Result<ForecastResponse> {
        let latitude = place.latitude.to_string();
        let longitude = place.longitude.to_string();

        self.client
            .get(&self.config.forecast_url)
            .query(&[("latitude", latitude.as_str()), ("longitude", longitude.as_str())])
            .query(extra)
            .send()
            .await
            .context("Forecast request failed")?
            .error_for_status()
            .context("Forecast service returned non-success status")?
            .json()
            .await
            .context("Failed to parse forecast response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_defaults() {
        let config = OpenMeteoConfig::default();
        assert!(config.geocoding_url.starts_with("https://geocoding-api.open-meteo.com"));
        assert_eq!(config.timeout().unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_timeouts_are_config_errors() {
        for seconds in [-1.0, 0.0, f64::NAN, f64::INFINITY, 1e300] {
            let config = OpenMeteoConfig::default().with_timeout(seconds);
            assert!(
                matches!(config.timeout(), Err(ToolgateError::Config(_))),
                "{seconds} should be rejected"
            );
            assert!(config.validate().is_err());
            assert!(OpenMeteoClient::new(config).is_err());
        }
    }

    #[test]
    fn test_config_partial_json_uses_defaults() {
        let config: OpenMeteoConfig = serde_json::from_value(json!({"timeout_seconds": 2.5})).unwrap();
        assert_eq!(config.timeout_seconds, 2.5);
        assert_eq!(config.forecast_url, default_forecast_url());
    }

    #[test]
    fn test_with_base_url() {
        let config = OpenMeteoConfig::default().with_base_url("http://127.0.0.1:8080/");
        assert_eq!(config.geocoding_url, "http://127.0.0.1:8080/v1/search");
        assert_eq!(config.forecast_url, "http://127.0.0.1:8080/v1/forecast");
    }

    #[test]
    fn test_parse_geocoding_payload() {
        let response: GeocodingResponse = serde_json::from_value(json!({
            "results": [{
                "id": 3143244,
                "name": "Oslo",
                "latitude": 59.91,
                "longitude": 10.75,
                "country": "Norway",
                "timezone": "Europe/Oslo"
            }],
            "generationtime_ms": 0.5
        }))
        .unwrap();

        let place = &response.results[0];
        assert_eq!(place.country, "Norway");
        assert_eq!(place.timezone.as_deref(), Some("Europe/Oslo"));

        let empty: GeocodingResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.results.is_empty());
    }

    #[test]
    fn test_parse_forecast_payload() {
        let forecast: ForecastResponse = serde_json::from_value(json!({
            "utc_offset_seconds": 7200,
            "timezone": "Europe/Oslo",
            "timezone_abbreviation": "CEST",
            "current": {"time": "2025-06-01T12:00", "interval": 900, "temperature_2m": 18.4}
        }))
        .unwrap();

        assert_eq!(forecast.utc_offset_seconds, 7200);
        assert_eq!(forecast.timezone_abbreviation.as_deref(), Some("CEST"));
        assert_eq!(forecast.current.map(|c| c.temperature_2m), Some(18.4));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_error() {
        let client =
            OpenMeteoClient::new(OpenMeteoConfig::default().with_base_url("http://127.0.0.1:9").with_timeout(2.0))
                .unwrap();

        let err = client.geocode("Oslo").await.unwrap_err();
        assert!(format!("{err:#}").contains("Geocoding request failed"));
    }
}
