//! Sample tools backed by the Open-Meteo APIs.
//!
//! `getWeatherInformationTool` is confirmable and only runs after approval;
//! `getLocalTimeTool` executes on its own.

mod local_time;
mod open_meteo;
mod weather;

pub use local_time::{format_local_time, local_time_definition, LocalTimeTool};
pub use open_meteo::{OpenMeteoClient, OpenMeteoConfig, Place, ZoneOffset};
pub use weather::{weather_definition, WeatherReport, WeatherTool};

use crate::errors::ToolgateError;
use crate::tools::{ExecutionRegistry, ToolRegistry};

/// Name of the weather tool.
pub const WEATHER_TOOL: &str = "getWeatherInformationTool";

/// Name of the local time tool.
pub const LOCAL_TIME_TOOL: &str = "getLocalTimeTool";

/// Builds the tool and execution registries for the sample tools.
pub fn default_registries(
    config: &OpenMeteoConfig,
) -> Result<(ToolRegistry, ExecutionRegistry), ToolgateError> {
    let client = OpenMeteoClient::new(config.clone())
        .map_err(|e| ToolgateError::config(format!("{e:#}")))?;

    let tools = ToolRegistry::builder()
        .tool(weather_definition())
        .tool(local_time_definition(client.clone()))
        .build()?;

    let executions = ExecutionRegistry::builder(&tools)
        .handler(WEATHER_TOOL, WeatherTool::new(client))
        .build()?;

    Ok((tools, executions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registries() {
        let (tools, executions) = default_registries(&OpenMeteoConfig::default()).unwrap();

        assert_eq!(
            tools.names().collect::<Vec<_>>(),
            vec![LOCAL_TIME_TOOL, WEATHER_TOOL]
        );
        assert!(executions.is_gated(WEATHER_TOOL));
        assert!(!executions.is_gated(LOCAL_TIME_TOOL));
        assert!(executions.lookup(WEATHER_TOOL).is_registered());
    }
}
