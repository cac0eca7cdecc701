use crate::domain::model::{ContentType, Entry, EntryQuery, UnpublishAck, UnpublishRequest};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Read access to the delivery API and write access to the management API.
///
/// `unpublish` must report a rate-limit response as
/// [`CmsError::RateLimitError`](crate::utils::error::CmsError::RateLimitError) so the
/// retry wrapper can tell it apart from a real failure.
#[async_trait]
pub trait CmsClient: Send + Sync {
    async fn list_content_types(&self) -> Result<Vec<ContentType>>;
    async fn list_entries(&self, content_type: &str, query: &EntryQuery) -> Result<Vec<Entry>>;
    async fn unpublish(&self, request: &UnpublishRequest) -> Result<UnpublishAck>;
}

/// Waits between retries. `now` is the clock the retry bounds are measured
/// against, so a fake sleeper can also fake the passage of time.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}
