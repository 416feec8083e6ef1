use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use travel_search_tools::{TomlConfig, TravelTools};

const HOTEL_PATH: &str = "/v2/acts/pK2iIKVVxERtpwXMy/run-sync-get-dataset-items";
const FLIGHT_PATH: &str = "/v2/acts/jupri~kayak-flights/run-sync-get-dataset-items";

fn config_for(server: &MockServer) -> Result<TomlConfig> {
    let toml_content = format!(
        r#"
[providers.brightdata]
api_key = "test-key"

[providers.apify]
base_url = "{}"
token = "apify-token"
timeout_seconds = 5
"#,
        server.base_url()
    );
    Ok(TomlConfig::from_toml_str(&toml_content)?)
}

#[tokio::test]
async fn test_hotel_search_salvages_and_filters() -> Result<()> {
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path(HOTEL_PATH)
            .header("Authorization", "Bearer apify-token")
            .json_body(json!({"location": ["Lisbon", "region:6047843", "38.7223,-9.1393"], "limit": 5}));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([
                {"url": "https://x", "name": "Hotel X", "rating": "4.5", "amenities": ["wifi"]},
                {"rating": 3.9, "price": 88},
                {"url": "https://y", "name": "Hotel Y", "stars": 4, "price": 140.0, "currency": "EUR"}
            ]));
    });

    let tools = TravelTools::from_config(&config_for(&server)?);
    let output = tools
        .call(
            "get-hotels",
            json!({"location": ["Lisbon", " region:6047843 ", "38.7223, -9.1393"]}),
        )
        .await?;

    api_mock.assert();
    println!("📊 Output: {}", output);

    let hotels = output["hotels"].as_array().expect("hotels array");
    assert_eq!(hotels.len(), 2);

    assert_eq!(hotels[0]["name"], "Hotel X");
    assert!(hotels[0]["rating"].is_null());
    assert_eq!(hotels[0]["amenities"], json!(["wifi"]));

    assert_eq!(hotels[1]["name"], "Hotel Y");
    assert_eq!(hotels[1]["stars"], 4);
    assert!(hotels[1]["roomType"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_paged_dataset_object_is_accepted() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(HOTEL_PATH);
        then.status(200).json_body(json!({
            "items": [{"url": "https://z", "name": "Hotel Z", "price": 99.5}],
            "total": 1,
            "offset": 0
        }));
    });

    let tools = TravelTools::from_config(&config_for(&server)?);
    let output = tools
        .call("get-hotels", json!({"location": ["Porto"], "limit": 1}))
        .await?;

    assert_eq!(
        output,
        json!({"hotels": [{"url": "https://z", "name": "Hotel Z", "price": 99.5}]})
    );
    Ok(())
}

#[tokio::test]
async fn test_unexpected_dataset_shape_returns_empty() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(HOTEL_PATH);
        then.status(200).json_body(json!({"message": "actor run timed out"}));
    });

    let tools = TravelTools::from_config(&config_for(&server)?);
    let output = tools.call("get-hotels", json!({"location": ["Porto"]})).await?;

    assert_eq!(output, json!({"hotels": []}));
    Ok(())
}

/// 不同工具同時呼叫互不影響
#[tokio::test]
async fn test_concurrent_flight_and_hotel_searches() -> Result<()> {
    let server = MockServer::start();

    let hotel_mock = server.mock(|when, then| {
        when.method(POST).path(HOTEL_PATH);
        then.status(200)
            .json_body(json!([{"url": "https://h", "name": "Hotel H"}]));
    });
    let flight_mock = server.mock(|when, then| {
        when.method(POST).path(FLIGHT_PATH);
        then.status(200)
            .json_body(json!([{"url": "https://f", "price": "$300"}]));
    });

    let tools = TravelTools::from_config(&config_for(&server)?);
    let (flights, hotels) = tokio::join!(
        tools.call(
            "get-flights",
            json!({"origin": "SFO", "destination": "LIS", "departureDate": "2026-11-03"})
        ),
        tools.call("get-hotels", json!({"location": ["Lisbon"]})),
    );

    hotel_mock.assert();
    flight_mock.assert();
    assert_eq!(flights?["flights"].as_array().map(Vec::len), Some(1));
    assert_eq!(hotels?["hotels"].as_array().map(Vec::len), Some(1));
    Ok(())
}
