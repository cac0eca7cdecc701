use crate::config::{Credentials, API_KEY_VAR, DELIVERY_TOKEN_VAR, MANAGEMENT_TOKEN_VAR};
use crate::domain::model::RunMode;
use crate::utils::error::{CmsError, Result};
use crate::utils::validation::{validate_range, validate_required_field, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_DELIVERY_URL: &str = "https://cdn.contentstack.io/v3";
pub const DEFAULT_MANAGEMENT_URL: &str = "https://api.contentstack.io/v3";
pub const MAX_PAGE_SIZE: usize = 100;

/// Optional settings file. Every field has a default so a run needs no file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    pub credentials: Option<CredentialSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_delivery_url")]
    pub delivery_url: String,
    #[serde(default = "default_management_url")]
    pub management_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            delivery_url: default_delivery_url(),
            management_url: default_management_url(),
            timeout_seconds: default_timeout_seconds(),
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrySettings {
    pub max_retries: Option<u32>,
    pub max_wait_ms: Option<u64>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialSettings {
    pub api_key: Option<String>,
    pub delivery_token: Option<String>,
    pub management_token: Option<String>,
}

impl std::fmt::Debug for CredentialSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSettings").finish_non_exhaustive()
    }
}

fn default_delivery_url() -> String {
    DEFAULT_DELIVERY_URL.to_string()
}

fn default_management_url() -> String {
    DEFAULT_MANAGEMENT_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_page_size() -> usize {
    MAX_PAGE_SIZE
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CmsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unset variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CmsError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn resolve_credentials(&self, mode: RunMode) -> Result<Credentials> {
        self.resolve_credentials_with(mode, |name| std::env::var(name).ok())
    }

    /// File values win over the environment. The management token is only
    /// required for live runs.
    pub fn resolve_credentials_with<F>(&self, mode: RunMode, lookup: F) -> Result<Credentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_file = self.credentials.clone().unwrap_or_default();
        let pick = |file_value: Option<String>, var: &str| {
            file_value
                .filter(|v| !v.trim().is_empty() && !v.starts_with("${"))
                .or_else(|| lookup(var).filter(|v| !v.trim().is_empty()))
        };

        let api_key = pick(from_file.api_key, API_KEY_VAR);
        let delivery_token = pick(from_file.delivery_token, DELIVERY_TOKEN_VAR);
        let management_token = pick(from_file.management_token, MANAGEMENT_TOKEN_VAR);

        if mode.is_live() {
            validate_required_field(MANAGEMENT_TOKEN_VAR, &management_token)?;
        }

        Ok(Credentials {
            api_key: validate_required_field(API_KEY_VAR, &api_key)?.clone(),
            delivery_token: validate_required_field(DELIVERY_TOKEN_VAR, &delivery_token)?.clone(),
            management_token,
        })
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("api.delivery_url", &self.api.delivery_url)?;
        validate_url("api.management_url", &self.api.management_url)?;
        validate_range("api.page_size", self.api.page_size, 1, MAX_PAGE_SIZE)?;
        validate_range("api.timeout_seconds", self.api.timeout_seconds, 1, 600)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = Settings::from_toml_str("").unwrap();

        assert_eq!(settings.api.delivery_url, DEFAULT_DELIVERY_URL);
        assert_eq!(settings.api.management_url, DEFAULT_MANAGEMENT_URL);
        assert_eq!(settings.api.page_size, 100);
        assert_eq!(settings.api.timeout_seconds, 30);
        assert!(settings.retry.max_retries.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_parse_full_settings() {
        let toml_content = r#"
[api]
delivery_url = "https://eu-cdn.contentstack.com/v3"
management_url = "https://eu-api.contentstack.com/v3"
timeout_seconds = 10
page_size = 50

[retry]
max_retries = 20
max_wait_ms = 60000
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();

        assert_eq!(settings.api.delivery_url, "https://eu-cdn.contentstack.com/v3");
        assert_eq!(settings.api.page_size, 50);
        assert_eq!(settings.retry.max_retries, Some(20));
        assert_eq!(settings.retry.max_wait_ms, Some(60000));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CMS_UNPUBLISHER_TEST_DELIVERY_URL", "https://test.cdn.io/v3");

        let toml_content = r#"
[api]
delivery_url = "${CMS_UNPUBLISHER_TEST_DELIVERY_URL}"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert_eq!(settings.api.delivery_url, "https://test.cdn.io/v3");

        std::env::remove_var("CMS_UNPUBLISHER_TEST_DELIVERY_URL");
    }

    #[test]
    fn test_invalid_settings_fail_validation() {
        let bad_url = Settings::from_toml_str("[api]\ndelivery_url = \"invalid-url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_page = Settings::from_toml_str("[api]\npage_size = 500\n").unwrap();
        assert!(bad_page.validate().is_err());
    }

    #[test]
    fn test_settings_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[retry]\nmax_retries = 3\n")
            .unwrap();

        let settings = Settings::from_file(temp_file.path()).unwrap();
        assert_eq!(settings.retry.max_retries, Some(3));
    }

    #[test]
    fn test_credentials_from_environment() {
        let settings = Settings::default();
        let lookup = env(&[
            (API_KEY_VAR, "key"),
            (DELIVERY_TOKEN_VAR, "delivery"),
            (MANAGEMENT_TOKEN_VAR, "management"),
        ]);

        let credentials = settings.resolve_credentials_with(RunMode::Live, lookup).unwrap();

        assert_eq!(credentials.api_key, "key");
        assert_eq!(credentials.delivery_token, "delivery");
        assert_eq!(credentials.management_token.as_deref(), Some("management"));
    }

    #[test]
    fn test_file_credentials_win_over_environment() {
        let settings = Settings {
            credentials: Some(CredentialSettings {
                api_key: Some("file-key".to_string()),
                delivery_token: Some("${UNSET_TOKEN}".to_string()),
                management_token: None,
            }),
            ..Settings::default()
        };
        let lookup = env(&[(API_KEY_VAR, "env-key"), (DELIVERY_TOKEN_VAR, "env-delivery")]);

        let credentials = settings.resolve_credentials_with(RunMode::DryRun, lookup).unwrap();

        assert_eq!(credentials.api_key, "file-key");
        assert_eq!(credentials.delivery_token, "env-delivery");
        assert!(credentials.management_token.is_none());
    }

    #[test]
    fn test_management_token_required_only_for_live_runs() {
        let settings = Settings::default();
        let lookup = env(&[(API_KEY_VAR, "key"), (DELIVERY_TOKEN_VAR, "delivery")]);

        assert!(settings
            .resolve_credentials_with(RunMode::DryRun, &lookup)
            .is_ok());
        match settings.resolve_credentials_with(RunMode::Live, &lookup) {
            Err(CmsError::MissingConfigError { field }) => assert_eq!(field, MANAGEMENT_TOKEN_VAR),
            other => panic!("expected missing management token, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let settings = Settings::default();
        let lookup = env(&[(DELIVERY_TOKEN_VAR, "delivery")]);

        assert!(matches!(
            settings.resolve_credentials_with(RunMode::DryRun, lookup),
            Err(CmsError::MissingConfigError { .. })
        ));
    }
}
