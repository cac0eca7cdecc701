pub mod age_filter;
pub mod retry;
pub mod stop;
pub mod workflow;

pub use crate::domain::ports::{CmsClient, Sleeper, TokioSleeper};
