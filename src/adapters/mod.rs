// Adapters layer: the search tools and the HTTP clients behind them.

pub mod flight_search;
pub mod hotel_search;
pub mod http;
pub mod web_search;

use crate::config::toml_config::TomlConfig;
use crate::core::SearchTool;
use crate::utils::error::{Result, ToolError};
use crate::utils::validation::Validate;
use serde::Serialize;
use serde_json::Value;

pub use flight_search::{FlightSearchInput, FlightSearchOutput, FlightSearchTool, SortKey};
pub use hotel_search::{HotelSearchInput, HotelSearchOutput, HotelSearchTool, LocationQuery};
pub use http::{ApifyClient, BrightDataClient};
pub use web_search::{SearchToken, WebSearchInput, WebSearchOutput, WebSearchTool};

/// 以 JSON 參數呼叫工具：輸入不合法時回傳錯誤，其餘情況一律回傳輸出
pub async fn invoke_json<T: SearchTool>(tool: &T, args: Value) -> Result<Value> {
    let input: T::Input = serde_json::from_value(args)
        .map_err(|e| ToolError::invalid_input(tool.id(), e.to_string()))?;
    input.validate()?;

    let output = tool.execute(input).await;
    Ok(serde_json::to_value(output)?)
}

/// 只檢查該工具用到的供應商金鑰
pub fn require_credentials_for(config: &TomlConfig, id: &str) -> Result<()> {
    match id {
        web_search::TOOL_ID => config.require_brightdata(),
        flight_search::TOOL_ID | hotel_search::TOOL_ID => config.require_apify(),
        _ => Err(ToolError::UnknownTool { id: id.to_string() }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub id: &'static str,
    pub description: &'static str,
}

/// 三個旅遊搜尋工具。彼此無共享可變狀態，可並行呼叫。
#[derive(Debug, Clone)]
pub struct TravelTools {
    pub web: WebSearchTool,
    pub flights: FlightSearchTool,
    pub hotels: HotelSearchTool,
}

impl TravelTools {
    pub fn from_config(config: &TomlConfig) -> Self {
        let apify = ApifyClient::new(config.providers.apify.clone());
        Self {
            web: WebSearchTool::new(BrightDataClient::new(config.providers.brightdata.clone())),
            flights: FlightSearchTool::new(apify.clone()),
            hotels: HotelSearchTool::new(apify),
        }
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        vec![
            descriptor(&self.web),
            descriptor(&self.flights),
            descriptor(&self.hotels),
        ]
    }

    pub async fn call(&self, id: &str, args: Value) -> Result<Value> {
        tracing::debug!("🧰 Calling tool {}", id);
        match id {
            web_search::TOOL_ID => invoke_json(&self.web, args).await,
            flight_search::TOOL_ID => invoke_json(&self.flights, args).await,
            hotel_search::TOOL_ID => invoke_json(&self.hotels, args).await,
            _ => Err(ToolError::UnknownTool { id: id.to_string() }),
        }
    }
}

fn descriptor<T: SearchTool>(tool: &T) -> ToolDescriptor {
    ToolDescriptor {
        id: tool.id(),
        description: tool.description(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tools() -> TravelTools {
        TravelTools::from_config(&TomlConfig::default())
    }

    #[test]
    fn test_descriptors_list_every_tool() {
        let ids: Vec<&str> = tools().descriptors().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["brightdata-web-search", "get-flights", "get-hotels"]);
    }

    #[test]
    fn test_unknown_tool_is_rejected() {
        let result = tokio_test::block_on(tools().call("get-weather", json!({})));
        assert!(matches!(result, Err(ToolError::UnknownTool { .. })));
    }

    #[test]
    fn test_web_search_needs_only_brightdata_key() {
        let config = TomlConfig::from_toml_str("[providers.brightdata]\napi_key = \"bd-key\"").unwrap();

        assert!(require_credentials_for(&config, "brightdata-web-search").is_ok());
        assert!(matches!(
            require_credentials_for(&config, "get-flights"),
            Err(ToolError::MissingConfigError { .. })
        ));
        assert!(matches!(
            require_credentials_for(&config, "get-hotels"),
            Err(ToolError::MissingConfigError { .. })
        ));
        assert!(matches!(
            require_credentials_for(&config, "get-weather"),
            Err(ToolError::UnknownTool { .. })
        ));
    }

    #[test]
    fn test_apify_only_config_allows_flights_and_hotels() {
        let config = TomlConfig::from_toml_str("[providers.apify]\ntoken = \"apify-token\"").unwrap();

        assert!(require_credentials_for(&config, "get-flights").is_ok());
        assert!(require_credentials_for(&config, "get-hotels").is_ok());
        assert!(require_credentials_for(&config, "brightdata-web-search").is_err());
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_fetch() {
        let tools = tools();

        let result = tools.call("brightdata-web-search", json!({"query": "new york"})).await;
        assert!(matches!(result, Err(ToolError::InvalidInput { .. })));

        let result = tools
            .call("get-flights", json!({"origin": "SFO", "destination": "", "departureDate": "2026-11-03"}))
            .await;
        assert!(matches!(result, Err(ToolError::InvalidInput { .. })));

        let result = tools.call("get-hotels", json!({"location": ["  "]})).await;
        assert!(matches!(result, Err(ToolError::InvalidInput { .. })));
    }
}
