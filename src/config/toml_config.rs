use crate::utils::error::{Result, ToolError};
use crate::utils::validation::{validate_non_empty_string, validate_positive_number, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BRIGHTDATA_ENDPOINT: &str = "https://api.brightdata.com/request";
pub const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search";
pub const DEFAULT_APIFY_BASE_URL: &str = "https://api.apify.com";
pub const DEFAULT_FLIGHT_ACTOR: &str = "jupri~kayak-flights";
pub const DEFAULT_HOTEL_ACTOR: &str = "pK2iIKVVxERtpwXMy";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub brightdata: BrightDataConfig,
    #[serde(default)]
    pub apify: ApifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrightDataConfig {
    pub endpoint: String,
    pub api_key: String,
    pub zone: String,
    pub search_url: String,
    pub timeout_seconds: u64,
}

impl Default for BrightDataConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_BRIGHTDATA_ENDPOINT.to_string(),
            api_key: String::new(),
            zone: "serp_api1".to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApifyConfig {
    pub base_url: String,
    pub token: String,
    pub flight_actor: String,
    pub hotel_actor: String,
    /// actor 同步執行可能要幾分鐘
    pub timeout_seconds: u64,
}

impl Default for ApifyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_APIFY_BASE_URL.to_string(),
            token: String::new(),
            flight_actor: DEFAULT_FLIGHT_ACTOR.to_string(),
            hotel_actor: DEFAULT_HOTEL_ACTOR.to_string(),
            timeout_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl BrightDataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl ApifyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ToolError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ToolError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 沒有設定檔時：全部用預設值，金鑰從環境變數讀
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("BRIGHTDATA_API_KEY") {
            config.providers.brightdata.api_key = key;
        }
        if let Ok(token) = std::env::var("APIFY_API_KEY") {
            config.providers.apify.token = token;
        }
        config
    }

    /// 替換環境變數 (例如 ${API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ToolError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        let brightdata = &self.providers.brightdata;
        validate_url("providers.brightdata.endpoint", &brightdata.endpoint)?;
        validate_url("providers.brightdata.search_url", &brightdata.search_url)?;
        validate_non_empty_string("providers.brightdata.zone", &brightdata.zone)?;
        validate_positive_number(
            "providers.brightdata.timeout_seconds",
            brightdata.timeout_seconds,
            1,
        )?;

        let apify = &self.providers.apify;
        validate_url("providers.apify.base_url", &apify.base_url)?;
        validate_non_empty_string("providers.apify.flight_actor", &apify.flight_actor)?;
        validate_non_empty_string("providers.apify.hotel_actor", &apify.hotel_actor)?;
        validate_positive_number("providers.apify.timeout_seconds", apify.timeout_seconds, 1)?;

        Ok(())
    }

    /// 金鑰按供應商分開檢查：只有實際對該供應商搜尋時才需要
    pub fn require_brightdata(&self) -> Result<()> {
        require_secret("providers.brightdata.api_key", &self.providers.brightdata.api_key)
    }

    pub fn require_apify(&self) -> Result<()> {
        require_secret("providers.apify.token", &self.providers.apify.token)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

fn require_secret(field: &str, value: &str) -> Result<()> {
    // 未替換的 ${VAR} 代表環境變數沒設
    if value.trim().is_empty() || value.starts_with("${") {
        return Err(ToolError::MissingConfigError {
            field: field.to_string(),
        });
    }
    Ok(())
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
