pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::{Cli, Command, RunArgs};

pub use crate::adapters::http::ContentstackClient;
pub use crate::config::{settings::Settings, Credentials, RunOptions};
pub use crate::core::{retry::RetryPolicy, stop::StopSignal, workflow::Workflow};
pub use crate::domain::model::{RunMode, RunOutcome, RunReport, RunSummary};
pub use crate::utils::error::{CmsError, Result};
