use crate::config::toml_config::{ApifyConfig, BrightDataConfig};
use crate::domain::model::RawRecord;
use crate::utils::error::{Result, ToolError};
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;

/// Bright Data SERP API（代抓 Google 搜尋結果頁）
#[derive(Debug, Clone)]
pub struct BrightDataClient {
    client: Client,
    config: BrightDataConfig,
}

impl BrightDataClient {
    pub fn new(config: BrightDataConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub async fn search(&self, query: &str) -> Result<Value> {
        let search_url = Url::parse_with_params(&self.config.search_url, &[("q", query)]).map_err(|e| {
            ToolError::InvalidConfigValueError {
                field: "providers.brightdata.search_url".to_string(),
                value: self.config.search_url.clone(),
                reason: e.to_string(),
            }
        })?;

        let body = json!({
            "zone": self.config.zone,
            "url": search_url.as_str(),
            "format": "json",
        });

        tracing::debug!("📡 Bright Data request: {}", search_url);

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .timeout(self.config.timeout())
            .send()
            .await?;

        tracing::debug!("📡 Bright Data response status: {}", response.status());
        read_json("Bright Data", response).await
    }
}

/// Apify actor 同步執行，直接取回 dataset items
#[derive(Debug, Clone)]
pub struct ApifyClient {
    client: Client,
    config: ApifyConfig,
}

impl ApifyClient {
    pub fn new(config: ApifyConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ApifyConfig {
        &self.config
    }

    pub async fn run_actor(&self, actor: &str, input: &Value) -> Result<Vec<RawRecord>> {
        let endpoint = format!(
            "{}/v2/acts/{}/run-sync-get-dataset-items",
            self.config.base_url.trim_end_matches('/'),
            actor
        );

        tracing::debug!("📡 Running Apify actor {}", actor);

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.config.token)
            .json(input)
            .timeout(self.config.timeout())
            .send()
            .await?;

        tracing::debug!("📡 Apify response status: {}", response.status());
        let body = read_json("Apify", response).await?;

        dataset_items(body).ok_or_else(|| ToolError::ProviderStatus {
            provider: "Apify",
            status: 200,
            body: "response carried no dataset items".to_string(),
        })
    }
}

async fn read_json(provider: &'static str, response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ToolError::ProviderStatus {
            provider,
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

/// dataset 可能是陣列，也可能是 `{ items: [...] }` 的分頁物件
pub fn dataset_items(body: Value) -> Option<Vec<RawRecord>> {
    match body {
        Value::Array(items) => Some(items.into_iter().map(RawRecord).collect()),
        Value::Object(mut obj) => match obj.remove("items") {
            Some(Value::Array(items)) => Some(items.into_iter().map(RawRecord).collect()),
            _ => None,
        },
        _ => None,
    }
}
