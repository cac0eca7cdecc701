use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentType {
    pub uid: String,
}

/// An entry as returned by the delivery API. `created_at` is kept raw so a
/// malformed value can be reported instead of silently classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub uid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum RunMode {
    #[default]
    DryRun,
    Live,
}

impl RunMode {
    pub fn is_live(&self) -> bool {
        matches!(self, RunMode::Live)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::DryRun => write!(f, "dry-run"),
            RunMode::Live => write!(f, "live"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryQuery {
    pub environment: String,
    pub created_before: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpublishRequest {
    pub content_type_uid: String,
    pub entry_uid: String,
    pub environment: String,
    pub locale: String,
}

impl UnpublishRequest {
    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "entry": {
                "environments": [self.environment],
                "locales": [self.locale],
            },
            "locale": self.locale,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UnpublishAck {
    #[serde(default)]
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecisionAction {
    WouldUnpublish,
    Unpublished,
    Failed,
    Skipped,
    Malformed,
    /// The run was stopped while this entry was waiting out a rate limit.
    Interrupted,
}

/// One line of the run's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub content_type: String,
    pub entry_uid: String,
    pub title: String,
    pub created_at: String,
    pub action: DecisionAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub content_types: usize,
    pub stale: usize,
    pub unpublished: usize,
    pub failed: usize,
    pub skipped: usize,
    pub malformed: usize,
    pub content_type_failures: usize,
}

impl RunSummary {
    pub fn has_errors(&self) -> bool {
        self.failed > 0 || self.malformed > 0 || self.content_type_failures > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "content types: {}, stale: {}, unpublished: {}, failed: {}, skipped: {}, malformed: {}, content type failures: {}",
            self.content_types,
            self.stale,
            self.unpublished,
            self.failed,
            self.skipped,
            self.malformed,
            self.content_type_failures
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    CompletedWithErrors,
    AbortedFatal,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub summary: RunSummary,
    pub decisions: Vec<Decision>,
    pub fatal_error: Option<String>,
}
