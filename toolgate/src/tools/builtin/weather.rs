//! Weather lookup, a confirmable sample tool.

use super::open_meteo::{OpenMeteoClient, Place};
use super::WEATHER_TOOL;
use crate::errors::ToolError;
use crate::tools::{ExecutionContext, GatedExecute, ToolDefinition};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

/// Result payload of the weather tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// The geocoded city name, or the requested one if the match has none.
    pub city: String,
    /// Country of the geocoded match.
    pub country: String,
    /// Current temperature in degrees Celsius.
    pub temperature: String,
}

impl WeatherReport {
    /// The report returned when the lookup fails.
    #[must_use]
    pub fn unavailable(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: String::new(),
            temperature: "0".to_string(),
        }
    }
}

/// Tool definition advertised to the model.
#[must_use]
pub fn weather_definition() -> ToolDefinition {
    ToolDefinition::new(WEATHER_TOOL)
        .with_description("show the weather in a given city to the user")
        .with_parameters(json!({
            "type": "object",
            "properties": {
                "city": {"type": "string", "description": "The city to look up"},
                "temperature": {"type": "string", "description": "Temperature, filled in by the tool"},
                "country": {"type": "string", "description": "Country, filled in by the tool"}
            },
            "required": ["city"]
        }))
}

/// Gated handler that looks up the current temperature.
#[derive(Debug, Clone)]
pub struct WeatherTool {
    client: OpenMeteoClient,
    fallback: bool,
}

impl WeatherTool {
    /// Creates the handler. Lookup failures yield [`WeatherReport::unavailable`].
    #[must_use]
    pub fn new(client: OpenMeteoClient) -> Self {
        Self {
            client,
            fallback: true,
        }
    }

    /// Reports lookup failures as errors instead of a placeholder report.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.fallback = false;
        self
    }

    async fn lookup(&self, city: &str) -> anyhow::Result<WeatherReport> {
        let place = self.client.geocode(city).await?;
        let temperature = self.client.current_temperature(&place).await?;
        Ok(report_for(city, place, temperature))
    }
}

fn report_for(requested: &str, place: Place, temperature: f64) -> WeatherReport {
    let city = if place.name.trim().is_empty() {
        requested.to_string()
    } else {
        place.name
    };
    WeatherReport {
        city,
        country: place.country,
        temperature: temperature.to_string(),
    }
}

#[async_trait]
impl GatedExecute for WeatherTool {
    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: ExecutionContext,
    ) -> Result<serde_json::Value, ToolError> {
        let city = args
            .get("city")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ToolError::invalid_arguments(WEATHER_TOOL, "missing string field 'city'"))?;

        debug!(tool_call_id = %ctx.tool_call_id, city, "Looking up weather");

        let report = match self.lookup(city).await {
            Ok(report) => report,
            Err(e) if self.fallback => {
                let error = format!("{e:#}");
                warn!(city, error = %error, "Weather lookup failed, using placeholder");
                WeatherReport::unavailable(city)
            }
            Err(e) => return Err(ToolError::upstream(WEATHER_TOOL, e)),
        };

        serde_json::to_value(report)
            .map_err(|e| ToolError::execution_failed(WEATHER_TOOL, e.to_string()))
    }
}
