#[cfg(feature = "cli")]
pub mod cli;
pub mod settings;

use crate::core::retry::RetryPolicy;
use crate::domain::model::RunMode;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, Validate};
use chrono::{DateTime, Utc};
use std::fmt;

pub const API_KEY_VAR: &str = "REACT_API_KEY";
pub const DELIVERY_TOKEN_VAR: &str = "REACT_DELIVERY_TOKEN";
pub const MANAGEMENT_TOKEN_VAR: &str = "REACT_MANAGEMENT_TOKEN";

/// Everything one invocation needs, assembled once and never mutated.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub threshold: DateTime<Utc>,
    pub content_type_filter: Option<Vec<String>>,
    pub environment: String,
    pub locale: String,
    pub mode: RunMode,
    pub verbose: bool,
    pub retry: RetryPolicy,
    pub server_side_filter: bool,
}

impl RunOptions {
    pub fn new(threshold: DateTime<Utc>, environment: &str, locale: &str) -> Self {
        Self {
            threshold,
            content_type_filter: None,
            environment: environment.to_string(),
            locale: locale.to_string(),
            mode: RunMode::DryRun,
            verbose: false,
            retry: RetryPolicy::default(),
            server_side_filter: false,
        }
    }
}

impl Validate for RunOptions {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("environment", &self.environment)?;
        validate_non_empty_string("locale", &self.locale)?;
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub delivery_token: String,
    pub management_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("delivery_token", &"<redacted>")
            .field(
                "management_token",
                &self.management_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
