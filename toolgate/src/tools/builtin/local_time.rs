//! Local time lookup, an auto sample tool.

use super::open_meteo::OpenMeteoClient;
use super::LOCAL_TIME_TOOL;
use crate::errors::ToolError;
use crate::tools::{AutoExecute, ToolDefinition};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use serde_json::json;
use tracing::{debug, warn};

/// Formats `now` as wall-clock time at the given offset, `HH:MM:SS <abbr>`.
///
/// Offsets outside +-24h are treated as UTC.
#[must_use]
pub fn format_local_time(now: DateTime<Utc>, utc_offset_seconds: i32, abbreviation: &str) -> String {
    match FixedOffset::east_opt(utc_offset_seconds) {
        Some(offset) => format!("{} {abbreviation}", now.with_timezone(&offset).format("%H:%M:%S")),
        None => format_utc(now),
    }
}

fn format_utc(now: DateTime<Utc>) -> String {
    format!("{} UTC", now.format("%H:%M:%S"))
}

/// Tool definition advertised to the model, wired to `client`.
#[must_use]
pub fn local_time_definition(client: OpenMeteoClient) -> ToolDefinition {
    ToolDefinition::new(LOCAL_TIME_TOOL)
        .with_description("get the local time for a specified location")
        .with_parameters(json!({
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "The location to get the time for"}
            },
            "required": ["location"]
        }))
        .with_auto_execute(LocalTimeTool::new(client))
}

/// Auto handler resolving a location's current wall-clock time.
#[derive(Debug, Clone)]
pub struct LocalTimeTool {
    client: OpenMeteoClient,
}

impl LocalTimeTool {
    /// Creates the handler.
    #[must_use]
    pub fn new(client: OpenMeteoClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AutoExecute for LocalTimeTool {
    async fn execute(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let location = args
            .get("location")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                ToolError::invalid_arguments(LOCAL_TIME_TOOL, "missing string field 'location'")
            })?;

        let lookup = async {
            let place = self.client.geocode(location).await?;
            self.client.zone_offset(&place).await
        };

        let now = Utc::now();
        let formatted = match lookup.await {
            Ok(zone) => {
                debug!(location, offset = zone.utc_offset_seconds, "Resolved timezone");
                format_local_time(now, zone.utc_offset_seconds, &zone.abbreviation)
            }
            Err(e) => {
                let error = format!("{e:#}");
                warn!(location, error = %error, "Timezone lookup failed, using UTC");
                format_utc(now)
            }
        };

        Ok(serde_json::Value::String(formatted))
    }
}
