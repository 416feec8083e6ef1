use crate::adapters::http::BrightDataClient;
use crate::core::coercer::CoercionRules;
use crate::core::normalizer::{has_non_empty, TieredNormalizer};
use crate::core::SearchTool;
use crate::domain::model::{FieldSpec, FieldType, OutputRecord, OutputSchema, RawRecord};
use crate::utils::error::{Result, ToolError};
use crate::utils::validation::{validate_single_token, Validate};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub const TOOL_ID: &str = "brightdata-web-search";

/// 單一 token 的搜尋字串：trim 後非空且不含空白
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SearchToken(String);

impl SearchToken {
    pub fn parse(raw: &str) -> Result<Self> {
        validate_single_token("query", raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SearchToken {
    type Error = ToolError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl FromStr for SearchToken {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<SearchToken> for String {
    fn from(token: SearchToken) -> Self {
        token.0
    }
}

impl fmt::Display for SearchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchInput {
    pub query: SearchToken,
}

impl Validate for WebSearchInput {
    // 反序列化時 SearchToken 已經檢查過
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSearchOutput {
    pub results: Vec<OutputRecord>,
}

pub fn web_result_schema() -> OutputSchema {
    OutputSchema::new()
        .field(FieldSpec::required("title", FieldType::String).non_empty().or_default("No title"))
        .field(FieldSpec::required("link", FieldType::String).non_empty().or_default("#"))
        .field(FieldSpec::required("snippet", FieldType::String).non_empty().or_default("No snippet"))
        .field(FieldSpec::required("position", FieldType::Number).or_default(0))
}

pub fn web_normalizer() -> TieredNormalizer {
    TieredNormalizer::new(
        "web-search",
        web_result_schema(),
        CoercionRules::new(),
        |record| has_non_empty(record, "link"),
    )
}

/// SERP 回應中的 `organic` 陣列；沒有就視為零筆
pub fn organic_results(body: Value) -> Vec<RawRecord> {
    match body {
        Value::Object(mut obj) => match obj.remove("organic") {
            Some(Value::Array(items)) => items.into_iter().map(RawRecord).collect(),
            _ => {
                tracing::warn!("⚠️ No organic results found in the response");
                Vec::new()
            }
        },
        _ => {
            tracing::warn!("⚠️ Unexpected SERP response shape");
            Vec::new()
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebSearchTool {
    client: BrightDataClient,
    normalizer: TieredNormalizer,
}

impl WebSearchTool {
    pub fn new(client: BrightDataClient) -> Self {
        Self {
            client,
            normalizer: web_normalizer(),
        }
    }
}

#[async_trait]
impl SearchTool for WebSearchTool {
    type Input = WebSearchInput;
    type Output = WebSearchOutput;

    fn id(&self) -> &'static str {
        TOOL_ID
    }

    fn description(&self) -> &'static str {
        "Performs a web search using the Bright Data SERP API for Google."
    }

    async fn execute(&self, input: WebSearchInput) -> WebSearchOutput {
        tracing::info!("🔎 Web search: {}", input.query);

        let raw_items = match self.client.search(input.query.as_str()).await {
            Ok(body) => organic_results(body),
            Err(e) => {
                tracing::error!("❌ Web search for '{}' failed: {}", input.query, e);
                return WebSearchOutput::default();
            }
        };

        let results = self.normalizer.normalize(raw_items);
        tracing::info!("🔎 Web search returned {} results", results.len());
        WebSearchOutput { results }
    }
}
