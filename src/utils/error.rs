use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[source] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid tool input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown tool: {id}")]
    UnknownTool { id: String },

    #[error("{provider} responded with status {status}: {body}")]
    ProviderStatus {
        provider: &'static str,
        status: u16,
        body: String,
    },
}

impl ToolError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 呼叫端（agent 或 CLI 使用者）看得懂的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            ToolError::HttpError(_) | ToolError::ProviderStatus { .. } => {
                "Search provider could not be reached".to_string()
            }
            ToolError::IoError(e) => format!("File access failed: {}", e),
            ToolError::SerializationError(e) => format!("Malformed JSON: {}", e),
            ToolError::ConfigError { .. }
            | ToolError::MissingConfigError { .. }
            | ToolError::InvalidConfigValueError { .. } => format!("Configuration problem: {}", self),
            ToolError::InvalidInput { field, reason } => {
                format!("Tool input '{}' was rejected: {}", field, reason)
            }
            ToolError::UnknownTool { id } => format!("No tool is registered as '{}'", id),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ToolError::HttpError(_) | ToolError::ProviderStatus { .. } => {
                "Check network access and the provider API key"
            }
            ToolError::IoError(_) => "Check that the file exists and is readable",
            ToolError::SerializationError(_) => "Pass tool arguments as a valid JSON object",
            ToolError::ConfigError { .. } | ToolError::InvalidConfigValueError { .. } => {
                "Fix the configuration file and try again"
            }
            ToolError::MissingConfigError { .. } => {
                "Set the value in the config file or the matching environment variable"
            }
            ToolError::InvalidInput { .. } => "Correct the tool arguments and call again",
            ToolError::UnknownTool { .. } => "Run `travel-tools tools` to list available tools",
        }
    }
}

// 請求 URL 可能帶有金鑰，不放進錯誤訊息
impl From<reqwest::Error> for ToolError {
    fn from(e: reqwest::Error) -> Self {
        ToolError::HttpError(e.without_url())
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;
