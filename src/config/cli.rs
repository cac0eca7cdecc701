use crate::config::settings::Settings;
use crate::config::RunOptions;
use crate::core::age_filter::parse_threshold;
use crate::core::retry::RetryPolicy;
use crate::domain::model::RunMode;
use crate::utils::error::Result;
use crate::utils::validation::{parse_comma_list, validate_range, Validate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "cms-unpublisher")]
#[command(about = "Unpublishes CMS entries created before a threshold date")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Unpublishes entries older than a specific date
    Run(RunArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Threshold date to unpublish entries (YYYY-MM-DD [HH:mm:ss], UTC)
    #[arg(short = 'd', long = "unpublishOlderThan", visible_alias = "unpublish-older-than")]
    pub unpublish_older_than: String,

    /// Content type filter as a comma separated list of content types
    #[arg(short = 'f', long = "contentTypeFilter", visible_alias = "content-type-filter")]
    pub content_type_filter: Option<String>,

    /// Environment to unpublish entries from
    #[arg(short = 'e', long)]
    pub environment: String,

    /// Locale to unpublish entries from
    #[arg(short = 'l', long)]
    pub locale: String,

    /// Mode to run the script in
    #[arg(short = 'm', long, value_enum, default_value_t = RunMode::DryRun)]
    pub mode: RunMode,

    /// Milliseconds to wait before retrying a rate-limited request
    #[arg(short = 'w', long = "limitWait", visible_alias = "limit-wait", default_value_t = 100)]
    pub limit_wait: u64,

    /// Verbose mode
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Settings file (TOML) with API endpoints, retry bounds and credentials
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Delivery API base URL
    #[arg(long = "deliveryUrl", visible_alias = "delivery-url")]
    pub delivery_url: Option<String>,

    /// Management API base URL
    #[arg(long = "managementUrl", visible_alias = "management-url")]
    pub management_url: Option<String>,

    /// Give up on an entry after this many rate-limited retries (default: never)
    #[arg(long = "maxRetries", visible_alias = "max-retries")]
    pub max_retries: Option<u32>,

    /// Give up on an entry after waiting this many milliseconds in total
    #[arg(long = "maxWaitMs", visible_alias = "max-wait-ms")]
    pub max_wait_ms: Option<u64>,

    /// Also ask the delivery API to filter by created_at
    #[arg(long = "serverSideFilter", visible_alias = "server-side-filter")]
    pub server_side_filter: bool,

    /// Stop the run after this many seconds
    #[arg(long = "deadlineSecs", visible_alias = "deadline-secs")]
    pub deadline_secs: Option<u64>,

    /// Write every decision to this CSV file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Exit non-zero when any entry or content type failed
    #[arg(long)]
    pub strict: bool,

    /// Emit logs as JSON
    #[arg(long = "jsonLogs", visible_alias = "json-logs")]
    pub json_logs: bool,
}

impl RunArgs {
    /// Loads the settings file (if any) and applies flag overrides on top.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };

        if let Some(url) = &self.delivery_url {
            settings.api.delivery_url = url.clone();
        }
        if let Some(url) = &self.management_url {
            settings.api.management_url = url.clone();
        }
        if self.max_retries.is_some() {
            settings.retry.max_retries = self.max_retries;
        }
        if self.max_wait_ms.is_some() {
            settings.retry.max_wait_ms = self.max_wait_ms;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn run_options(&self, settings: &Settings) -> Result<RunOptions> {
        validate_range("limitWait", self.limit_wait, 0, 3_600_000)?;

        let content_type_filter = self
            .content_type_filter
            .as_deref()
            .map(parse_comma_list)
            .filter(|list| !list.is_empty());

        let options = RunOptions {
            threshold: parse_threshold(&self.unpublish_older_than)?,
            content_type_filter,
            environment: self.environment.trim().to_string(),
            locale: self.locale.trim().to_string(),
            mode: self.mode,
            verbose: self.verbose,
            retry: RetryPolicy {
                backoff: Duration::from_millis(self.limit_wait),
                max_retries: settings.retry.max_retries,
                max_wait: settings.retry.max_wait_ms.map(Duration::from_millis),
            },
            server_side_filter: self.server_side_filter,
        };

        options.validate()?;
        Ok(options)
    }
}
