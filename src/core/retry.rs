//! Rate-limit aware wrapper around the single mutating CMS call.
//!
//! The default policy retries forever after a fixed delay, the same request
//! each time. `max_retries` and `max_wait` bound it when an outage that keeps
//! answering "too many requests" must not stall the run indefinitely.

use crate::core::stop::StopSignal;
use crate::domain::model::{RunMode, UnpublishRequest};
use crate::domain::ports::{CmsClient, Sleeper};
use crate::utils::error::{CmsError, Result};
use std::time::Duration;

pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub backoff: Duration,
    pub max_retries: Option<u32>,
    pub max_wait: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded(DEFAULT_BACKOFF)
    }
}

impl RetryPolicy {
    pub fn unbounded(backoff: Duration) -> Self {
        Self {
            backoff,
            max_retries: None,
            max_wait: None,
        }
    }

    /// Whether another retry is allowed after `retries` retries, `elapsed`
    /// since the first attempt started. The next sleep must also fit in
    /// `max_wait`.
    fn allows_retry(&self, retries: u32, elapsed: Duration) -> bool {
        if self.max_retries.is_some_and(|max| retries >= max) {
            return false;
        }
        if let Some(max_wait) = self.max_wait {
            return elapsed + self.backoff <= max_wait;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    DryRun,
    Unpublished { attempts: u32 },
}

pub async fn attempt_unpublish<C, S>(
    client: &C,
    sleeper: &S,
    request: &UnpublishRequest,
    mode: RunMode,
    policy: &RetryPolicy,
    stop: &StopSignal,
) -> Result<AttemptOutcome>
where
    C: CmsClient + ?Sized,
    S: Sleeper,
{
    if !mode.is_live() {
        return Ok(AttemptOutcome::DryRun);
    }

    let started = sleeper.now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        match client.unpublish(request).await {
            Ok(ack) => {
                tracing::info!(
                    mode = %mode,
                    content_type = %request.content_type_uid,
                    entry_uid = %request.entry_uid,
                    attempts,
                    notice = ack.notice.as_deref().unwrap_or(""),
                    "Unpublished entry"
                );
                return Ok(AttemptOutcome::Unpublished { attempts });
            }
            Err(e) if e.is_rate_limited() => {
                let retries = attempts - 1;
                let elapsed = sleeper.now().saturating_duration_since(started);
                if !policy.allows_retry(retries, elapsed) {
                    return Err(CmsError::RetriesExhaustedError { attempts });
                }
                if stop.is_triggered() {
                    return Err(CmsError::CancelledError);
                }
                tracing::warn!(
                    mode = %mode,
                    entry_uid = %request.entry_uid,
                    attempt = attempts,
                    delay_ms = policy.backoff.as_millis() as u64,
                    "Rate limit exceeded, waiting before retry"
                );
                sleeper.sleep(policy.backoff).await;
            }
            Err(e) => {
                return Err(CmsError::UnpublishError {
                    entry_uid: request.entry_uid.clone(),
                    message: e.to_string(),
                });
            }
        }
    }
}
