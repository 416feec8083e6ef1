use crate::adapters::http::ApifyClient;
use crate::core::coercer::CoercionRules;
use crate::core::normalizer::{has_non_empty, TieredNormalizer};
use crate::core::SearchTool;
use crate::domain::model::{FieldSpec, FieldType, OutputRecord, OutputSchema};
use crate::utils::error::{Result, ToolError};
use crate::utils::validation::{validate_range, Validate};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

pub const TOOL_ID: &str = "get-hotels";
pub const DEFAULT_LIMIT: u32 = 5;

/// Expedia actor 接受的地點寫法
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LocationQuery {
    /// `region:6047843`
    Region(String),
    Coordinates { lat: f64, lon: f64 },
    HotelId(String),
    Place(String),
}

impl FromStr for LocationQuery {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ToolError::invalid_input("location", "Location cannot be empty"));
        }

        if let Some(id) = trimmed.strip_prefix("region:") {
            if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
                return Ok(LocationQuery::Region(id.to_string()));
            }
            return Err(ToolError::invalid_input(
                "location",
                format!("Region id must be numeric: {}", trimmed),
            ));
        }

        if let Some((lat, lon)) = trimmed.split_once(',') {
            if let (Ok(lat), Ok(lon)) = (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
                // "nan"/"inf" 也能解析成 f64，範圍檢查擋不住
                if !lat.is_finite() || !lon.is_finite() {
                    return Err(ToolError::invalid_input(
                        "location",
                        format!("Coordinates must be finite numbers: {}", trimmed),
                    ));
                }
                validate_range("location.lat", lat, -90.0, 90.0)?;
                validate_range("location.lon", lon, -180.0, 180.0)?;
                return Ok(LocationQuery::Coordinates { lat, lon });
            }
        }

        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Ok(LocationQuery::HotelId(trimmed.to_string()));
        }

        Ok(LocationQuery::Place(trimmed.to_string()))
    }
}

impl TryFrom<String> for LocationQuery {
    type Error = ToolError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::Region(id) => write!(f, "region:{}", id),
            LocationQuery::Coordinates { lat, lon } => write!(f, "{},{}", lat, lon),
            LocationQuery::HotelId(id) => f.write_str(id),
            LocationQuery::Place(name) => f.write_str(name),
        }
    }
}

impl From<LocationQuery> for String {
    fn from(location: LocationQuery) -> Self {
        location.to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelSearchInput {
    pub location: Vec<LocationQuery>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl HotelSearchInput {
    pub fn actor_input(&self) -> Value {
        let locations: Vec<String> = self.location.iter().map(ToString::to_string).collect();
        json!({
            "location": locations,
            "limit": self.limit.unwrap_or(DEFAULT_LIMIT),
        })
    }
}

impl Validate for HotelSearchInput {
    fn validate(&self) -> Result<()> {
        if self.location.is_empty() {
            return Err(ToolError::invalid_input("location", "At least one location is required"));
        }
        if self.limit == Some(0) {
            return Err(ToolError::invalid_input("limit", "Limit must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelSearchOutput {
    pub hotels: Vec<OutputRecord>,
}

pub fn hotel_schema() -> OutputSchema {
    OutputSchema::new()
        .field(FieldSpec::required("url", FieldType::String).non_empty().or_default(""))
        .field(FieldSpec::required("name", FieldType::String).non_empty().or_default(""))
        .field(FieldSpec::optional("address", FieldType::String))
        .field(FieldSpec::nullable("rating", FieldType::Number))
        .field(FieldSpec::nullable("reviews", FieldType::Integer))
        .field(FieldSpec::nullable("stars", FieldType::Integer))
        .field(FieldSpec::nullable("price", FieldType::Number))
        .field(FieldSpec::nullable("currency", FieldType::String))
        .field(FieldSpec::nullable("roomType", FieldType::String))
        .field(FieldSpec::nullable("persons", FieldType::Integer))
        .field(FieldSpec::nullable("image", FieldType::String))
        .passthrough()
}

pub fn hotel_normalizer() -> TieredNormalizer {
    TieredNormalizer::new("hotel-search", hotel_schema(), CoercionRules::new(), |record| {
        has_non_empty(record, "url") && has_non_empty(record, "name")
    })
}

#[derive(Debug, Clone)]
pub struct HotelSearchTool {
    client: ApifyClient,
    normalizer: TieredNormalizer,
}

impl HotelSearchTool {
    pub fn new(client: ApifyClient) -> Self {
        Self {
            client,
            normalizer: hotel_normalizer(),
        }
    }
}

#[async_trait]
impl SearchTool for HotelSearchTool {
    type Input = HotelSearchInput;
    type Output = HotelSearchOutput;

    fn id(&self) -> &'static str {
        TOOL_ID
    }

    fn description(&self) -> &'static str {
        "Get hotels for a location"
    }

    async fn execute(&self, input: HotelSearchInput) -> HotelSearchOutput {
        tracing::info!("🏨 Hotel search: {} location(s)", input.location.len());

        let actor = self.client.config().hotel_actor.clone();
        let raw_items = match self.client.run_actor(&actor, &input.actor_input()).await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("❌ Hotel search failed: {}", e);
                return HotelSearchOutput::default();
            }
        };

        let hotels = self.normalizer.normalize(raw_items);
        tracing::info!("🏨 Hotel search returned {} hotels", hotels.len());
        HotelSearchOutput { hotels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{RawRecord, Tier};

    #[test]
    fn test_location_query_parsing() {
        assert_eq!(
            "region:6047843".parse::<LocationQuery>().unwrap(),
            LocationQuery::Region("6047843".to_string())
        );
        assert_eq!(
            "48.8566, 2.3522".parse::<LocationQuery>().unwrap(),
            LocationQuery::Coordinates { lat: 48.8566, lon: 2.3522 }
        );
        assert_eq!(
            "1234567".parse::<LocationQuery>().unwrap(),
            LocationQuery::HotelId("1234567".to_string())
        );
        assert_eq!(
            " Paris, France ".parse::<LocationQuery>().unwrap(),
            LocationQuery::Place("Paris, France".to_string())
        );
    }

    #[test]
    fn test_location_query_rejections() {
        assert!("".parse::<LocationQuery>().is_err());
        assert!("region:abc".parse::<LocationQuery>().is_err());
        assert!("95.0,10.0".parse::<LocationQuery>().is_err());
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        for location in ["nan,nan", "NaN, 10.0", "10.0,inf", "-inf,0"] {
            assert!(
                matches!(location.parse::<LocationQuery>(), Err(ToolError::InvalidInput { .. })),
                "{} should be rejected",
                location
            );
        }
    }

    #[test]
    fn test_actor_input_uses_default_limit() {
        let input: HotelSearchInput =
            serde_json::from_value(json!({"location": ["Lisbon", "region:6047843"]})).unwrap();
        assert!(input.validate().is_ok());
        assert_eq!(
            input.actor_input(),
            json!({"location": ["Lisbon", "region:6047843"], "limit": 5})
        );
    }

    #[test]
    fn test_empty_location_list_is_rejected() {
        let input: HotelSearchInput = serde_json::from_value(json!({"location": []})).unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_string_rating_becomes_null() {
        let raw = vec![RawRecord(json!({"url": "https://x", "name": "Hotel X", "rating": "4.5"}))];
        let result = hotel_normalizer().normalize_with_report(raw);

        assert_eq!(result.tier, Tier::Coerced);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].get("rating"), Some(&Value::Null));
        assert_eq!(result.items[0].get_str("name"), Some("Hotel X"));
        assert!(result.items[0].get("address").is_none());
    }

    #[test]
    fn test_hotel_without_url_and_name_is_dropped() {
        let raw = vec![
            RawRecord(json!({"rating": 4.2, "price": 120})),
            RawRecord(json!({"url": "https://y", "name": "Hotel Y", "stars": 4})),
        ];
        let result = hotel_normalizer().normalize_with_report(raw);

        assert_eq!(result.tier, Tier::Filtered { dropped: 1 });
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].get_str("url"), Some("https://y"));
    }

    #[test]
    fn test_well_formed_hotels_pass_untouched() {
        let value = json!({
            "url": "https://z", "name": "Hotel Z", "rating": 8.6, "reviews": 1021,
            "stars": 5, "price": 310.5, "currency": "EUR", "image": null, "amenities": ["pool"]
        });
        let result = hotel_normalizer().normalize_with_report(vec![RawRecord(value.clone())]);

        assert_eq!(result.tier, Tier::Strict);
        assert_eq!(serde_json::to_value(&result.items[0]).unwrap(), value);
    }
}
