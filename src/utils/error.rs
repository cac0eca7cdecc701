use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmsError {
    #[error("API request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("CMS responded with status {status}: {message}")]
    ApiResponseError { status: u16, message: String },

    #[error("CSV report error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Failed to list content types: {source}")]
    ContentTypeListError {
        #[source]
        source: Box<CmsError>,
    },

    #[error("Failed to list entries of content type '{content_type}': {source}")]
    EntryListError {
        content_type: String,
        #[source]
        source: Box<CmsError>,
    },

    #[error("Rate limit exceeded: {message}")]
    RateLimitError { message: String },

    #[error("Failed to unpublish entry '{entry_uid}': {message}")]
    UnpublishError { entry_uid: String, message: String },

    #[error("Entry '{entry_uid}' has an unparsable created_at '{value}'")]
    MalformedTimestampError { entry_uid: String, value: String },

    #[error("Gave up after {attempts} rate-limited attempts")]
    RetriesExhaustedError { attempts: u32 },

    #[error("Run cancelled")]
    CancelledError,
}

pub type Result<T> = std::result::Result<T, CmsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    RateLimit,
    Data,
    Io,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CmsError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, CmsError::RateLimitError { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CmsError::MissingConfigError { .. }
            | CmsError::InvalidConfigValueError { .. }
            | CmsError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            CmsError::TransportError(_)
            | CmsError::ApiResponseError { .. }
            | CmsError::UnpublishError { .. } => ErrorCategory::Network,
            CmsError::ContentTypeListError { source } | CmsError::EntryListError { source, .. } => {
                source.category()
            }
            CmsError::RateLimitError { .. } | CmsError::RetriesExhaustedError { .. } => {
                ErrorCategory::RateLimit
            }
            CmsError::SerializationError(_) | CmsError::MalformedTimestampError { .. } => {
                ErrorCategory::Data
            }
            CmsError::CsvError(_) | CmsError::IoError(_) => ErrorCategory::Io,
            CmsError::CancelledError => ErrorCategory::Interrupted,
        }
    }

    /// How far the failure reaches: `Critical` stops the process, `High` stops
    /// the run, anything lower is isolated to one content type or entry.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CmsError::MissingConfigError { .. }
            | CmsError::InvalidConfigValueError { .. }
            | CmsError::ConfigValidationError { .. } => ErrorSeverity::Critical,
            CmsError::ContentTypeListError { .. } | CmsError::CancelledError => ErrorSeverity::High,
            CmsError::RateLimitError { .. } | CmsError::MalformedTimestampError { .. } => {
                ErrorSeverity::Low
            }
            _ => ErrorSeverity::Medium,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the command-line flags, the settings file and the REACT_* environment variables"
            }
            ErrorCategory::Network => {
                "Verify the API base URLs, the stack API key and that the tokens have the required scope"
            }
            ErrorCategory::RateLimit => "Increase --limitWait or raise --maxRetries",
            ErrorCategory::Data => "Inspect the offending entry in the CMS; its created_at is not a valid date",
            ErrorCategory::Io => "Make sure the report path is writable",
            ErrorCategory::Interrupted => "Re-run the command; already unpublished entries are skipped by the CMS",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CmsError::MissingConfigError { field } => {
                format!("Missing required setting '{}'", field)
            }
            CmsError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid value for '{}': {}", field, reason)
            }
            CmsError::ContentTypeListError { .. } => {
                "Could not list content types, nothing was processed".to_string()
            }
            other => other.to_string(),
        }
    }
}
