use crate::utils::error::{CmsError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(CmsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(CmsError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(CmsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| CmsError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CmsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(CmsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Splits a comma separated list, trimming items and dropping empty ones.
pub fn parse_comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("delivery_url", "https://cdn.contentstack.io/v3").is_ok());
        assert!(validate_url("delivery_url", "http://localhost:8080").is_ok());
        assert!(validate_url("delivery_url", "").is_err());
        assert!(validate_url("delivery_url", "invalid-url").is_err());
        assert!(validate_url("delivery_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("key".to_string());
        let missing: Option<String> = None;
        assert_eq!(validate_required_field("api_key", &present).unwrap(), "key");
        assert!(matches!(
            validate_required_field("api_key", &missing),
            Err(CmsError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("locale", "en-us").is_ok());
        assert!(validate_non_empty_string("locale", "   ").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("page_size", 100, 1, 100).is_ok());
        assert!(validate_range("page_size", 0, 1, 100).is_err());
        assert!(validate_range("page_size", 101, 1, 100).is_err());
    }

    #[test]
    fn test_parse_comma_list() {
        assert_eq!(
            parse_comma_list(" article, home ,,page"),
            vec!["article", "home", "page"]
        );
        assert!(parse_comma_list("").is_empty());
    }
}
