use crate::adapters::http::ApifyClient;
use crate::core::coercer::CoercionRules;
use crate::core::normalizer::{has_non_empty, TieredNormalizer};
use crate::core::SearchTool;
use crate::domain::model::{FieldSpec, FieldType, OutputRecord, OutputSchema};
use crate::utils::error::{Result, ToolError};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const TOOL_ID: &str = "get-flights";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Best,
    EarliestDepart,
    LatestDepart,
    EarliestArrive,
    LatestArrive,
    HighPrice,
    LowPrice,
    Slowest,
    Quickest,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Best => "best",
            SortKey::EarliestDepart => "earliest_depart",
            SortKey::LatestDepart => "latest_depart",
            SortKey::EarliestArrive => "earliest_arrive",
            SortKey::LatestArrive => "latest_arrive",
            SortKey::HighPrice => "high_price",
            SortKey::LowPrice => "low_price",
            SortKey::Slowest => "slowest",
            SortKey::Quickest => "quickest",
        }
    }
}

fn default_limit() -> u32 {
    10
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_adults() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchInput {
    /// 機場代碼（例如 SFO）或城市
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub non_stop: Option<bool>,
    #[serde(default)]
    pub one_stop: Option<bool>,
    #[serde(default)]
    pub two_plus_stops: Option<bool>,
    #[serde(default = "default_adults")]
    pub adults: u32,
}

impl FlightSearchInput {
    /// Kayak actor 的輸入格式：用 `origin.0` 這類帶索引的 key 表示航段
    pub fn actor_input(&self) -> Value {
        let mut input = Map::new();
        input.insert("origin.0".into(), self.origin.clone().into());
        input.insert("target.0".into(), self.destination.clone().into());
        input.insert("depart.0".into(), self.departure_date.to_string().into());
        input.insert("limit".into(), self.limit.into());
        input.insert("currency".into(), self.currency.clone().into());
        input.insert("sort".into(), self.sort.as_str().into());
        input.insert("filters.adults".into(), self.adults.into());

        // 來回票：第二段起訖對調
        if let Some(return_date) = self.return_date {
            input.insert("origin.1".into(), self.destination.clone().into());
            input.insert("target.1".into(), self.origin.clone().into());
            input.insert("depart.1".into(), return_date.to_string().into());
        }

        // 只送有設定的篩選條件
        if let Some(non_stop) = self.non_stop {
            input.insert("filters.non_stop".into(), non_stop.into());
        }
        if let Some(one_stop) = self.one_stop {
            input.insert("filters.one_stop".into(), one_stop.into());
        }
        if let Some(two_plus) = self.two_plus_stops {
            input.insert("filters.two_stop".into(), two_plus.into());
        }

        Value::Object(input)
    }
}

impl Validate for FlightSearchInput {
    fn validate(&self) -> Result<()> {
        if self.origin.trim().is_empty() {
            return Err(ToolError::invalid_input("origin", "Origin cannot be empty"));
        }
        if self.destination.trim().is_empty() {
            return Err(ToolError::invalid_input("destination", "Destination cannot be empty"));
        }
        if let Some(return_date) = self.return_date {
            if return_date < self.departure_date {
                return Err(ToolError::invalid_input(
                    "returnDate",
                    format!("{} is before departure date {}", return_date, self.departure_date),
                ));
            }
        }
        if self.limit == 0 {
            return Err(ToolError::invalid_input("limit", "Limit must be at least 1"));
        }
        if self.adults == 0 {
            return Err(ToolError::invalid_input("adults", "At least one adult is required"));
        }
        if self.currency.trim().is_empty() {
            return Err(ToolError::invalid_input("currency", "Currency cannot be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightSearchOutput {
    pub flights: Vec<OutputRecord>,
}

fn airline_schema() -> OutputSchema {
    OutputSchema::new()
        .field(FieldSpec::optional("name", FieldType::String))
        .field(FieldSpec::optional("code", FieldType::String))
        .field(FieldSpec::optional("logoUrl", FieldType::Url))
}

fn airport_schema() -> OutputSchema {
    OutputSchema::new()
        .field(FieldSpec::optional("code", FieldType::String))
        .field(FieldSpec::optional("cityName", FieldType::String))
        .field(FieldSpec::optional("displayName", FieldType::String))
}

fn endpoint_schema() -> OutputSchema {
    OutputSchema::new()
        .field(FieldSpec::optional("airport", FieldType::Object(airport_schema())))
        .field(FieldSpec::optional("isoDateTimeLocal", FieldType::String))
}

fn segment_schema() -> OutputSchema {
    OutputSchema::new()
        .field(FieldSpec::optional("airline", FieldType::Object(airline_schema())))
        .field(FieldSpec::optional("arrival", FieldType::Object(endpoint_schema())))
        .field(FieldSpec::optional("departure", FieldType::Object(endpoint_schema())))
        .field(FieldSpec::optional("durationMinutes", FieldType::Number))
        .field(FieldSpec::optional("flightNumber", FieldType::String))
}

fn leg_schema() -> OutputSchema {
    OutputSchema::new()
        .field(FieldSpec::optional("legDurationDisplay", FieldType::String))
        .field(FieldSpec::optional("legDurationMinutes", FieldType::Number))
        .field(FieldSpec::optional(
            "segments",
            FieldType::array_of(FieldType::Object(segment_schema())),
        ))
}

pub fn flight_schema() -> OutputSchema {
    OutputSchema::new()
        .field(FieldSpec::required("url", FieldType::String).non_empty().or_default(""))
        .field(FieldSpec::optional("displayAirline", FieldType::Object(airline_schema())))
        .field(FieldSpec::optional(
            "legs",
            FieldType::array_of(FieldType::Object(leg_schema())),
        ))
        // 缺少時由 Tier 2 從票價選項補上，補不到就是 null
        .field(FieldSpec::nullable("price", FieldType::String).always_present())
        .field(FieldSpec::nullable("provider", FieldType::String).always_present())
        .passthrough()
}

/// 價格與供應商取自第一個票價選項
pub fn flight_rules() -> CoercionRules {
    CoercionRules::new()
        .pointer("price", "/optionsByFare/0/options/0/displayPrice")
        .pointer("provider", "/optionsByFare/0/options/0/providerInfo/displayName")
}

pub fn flight_normalizer() -> TieredNormalizer {
    TieredNormalizer::new("flight-search", flight_schema(), flight_rules(), |record| {
        has_non_empty(record, "url")
    })
}

#[derive(Debug, Clone)]
pub struct FlightSearchTool {
    client: ApifyClient,
    normalizer: TieredNormalizer,
}

impl FlightSearchTool {
    pub fn new(client: ApifyClient) -> Self {
        Self {
            client,
            normalizer: flight_normalizer(),
        }
    }
}

#[async_trait]
impl SearchTool for FlightSearchTool {
    type Input = FlightSearchInput;
    type Output = FlightSearchOutput;

    fn id(&self) -> &'static str {
        TOOL_ID
    }

    fn description(&self) -> &'static str {
        "Get flights for a start and end location, with an optional date."
    }

    async fn execute(&self, input: FlightSearchInput) -> FlightSearchOutput {
        tracing::info!(
            "✈️ Flight search: {} -> {} on {}",
            input.origin,
            input.destination,
            input.departure_date
        );

        let actor = self.client.config().flight_actor.clone();
        let raw_items = match self.client.run_actor(&actor, &input.actor_input()).await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("❌ Flight search failed: {}", e);
                return FlightSearchOutput::default();
            }
        };

        let flights = self.normalizer.normalize(raw_items);
        tracing::info!("✈️ Flight search returned {} flights", flights.len());
        FlightSearchOutput { flights }
    }
}
