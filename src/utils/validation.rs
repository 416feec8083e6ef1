use crate::utils::error::{Result, ToolError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ToolError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ToolError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ToolError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(ToolError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ToolError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 單一 token 查詢：先 trim，再要求非空且內部不含任何空白字元。
/// 回傳 trim 後的字串。
pub fn validate_single_token(field_name: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::invalid_input(
            field_name,
            "Query cannot be empty after trimming.",
        ));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ToolError::invalid_input(
            field_name,
            "Query must be a single token with no spaces.",
        ));
    }
    Ok(trimmed.to_string())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ToolError::invalid_input(
            field_name,
            format!("Value {} must be between {} and {}", value, min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("providers.apify.base_url", "https://api.apify.com").is_ok());
        assert!(validate_url("providers.apify.base_url", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("providers.apify.base_url", "").is_err());
        assert!(validate_url("providers.apify.base_url", "invalid-url").is_err());
        assert!(validate_url("providers.apify.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("timeout_seconds", 30, 1).is_ok());
        assert!(validate_positive_number("timeout_seconds", 0, 1).is_err());
    }

    #[test]
    fn test_validate_single_token_trims_surrounding_whitespace() {
        assert_eq!(validate_single_token("query", "  paris  ").unwrap(), "paris");
        assert_eq!(validate_single_token("query", "tokyo").unwrap(), "tokyo");
    }

    #[test]
    fn test_validate_single_token_rejects_inner_whitespace_and_blank() {
        assert!(matches!(
            validate_single_token("query", "new york"),
            Err(ToolError::InvalidInput { .. })
        ));
        assert!(validate_single_token("query", "new\tyork").is_err());
        assert!(validate_single_token("query", "   ").is_err());
        assert!(validate_single_token("query", "").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("lat", 48.85, -90.0, 90.0).is_ok());
        assert!(validate_range("lat", 91.0, -90.0, 90.0).is_err());
    }
}
