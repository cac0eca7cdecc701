use crate::config::settings::ApiSettings;
use crate::config::Credentials;
use crate::domain::model::{ContentType, Entry, EntryQuery, UnpublishAck, UnpublishRequest};
use crate::domain::ports::CmsClient;
use crate::utils::error::{CmsError, Result};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const RATE_LIMIT_CODE: &str = "429";

/// A listing response: one page of items plus the total when `include_count`
/// was requested.
trait Page: DeserializeOwned {
    type Item;
    fn into_parts(self) -> (Vec<Self::Item>, Option<usize>);
}

#[derive(Debug, Deserialize)]
struct ContentTypesPage {
    #[serde(default)]
    content_types: Vec<ContentType>,
    count: Option<usize>,
}

impl Page for ContentTypesPage {
    type Item = ContentType;

    fn into_parts(self) -> (Vec<ContentType>, Option<usize>) {
        (self.content_types, self.count)
    }
}

#[derive(Debug, Deserialize)]
struct EntriesPage {
    #[serde(default)]
    entries: Vec<Entry>,
    count: Option<usize>,
}

impl Page for EntriesPage {
    type Item = Entry;

    fn into_parts(self) -> (Vec<Entry>, Option<usize>) {
        (self.entries, self.count)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    error_message: Option<String>,
    error_code: Option<serde_json::Value>,
    data_error_code: Option<serde_json::Value>,
}

fn code_str(code: &serde_json::Value) -> String {
    match code {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl ErrorPayload {
    fn is_error(&self) -> bool {
        self.error_code.is_some() || self.data_error_code.is_some()
    }

    fn is_rate_limit(&self) -> bool {
        [&self.error_code, &self.data_error_code]
            .into_iter()
            .flatten()
            .any(|code| code_str(code) == RATE_LIMIT_CODE)
    }

    fn message(&self) -> String {
        self.error_message
            .clone()
            .or_else(|| self.error_code.as_ref().map(code_str))
            .unwrap_or_else(|| "no error message".to_string())
    }
}

pub struct ContentstackClient {
    client: Client,
    delivery_url: String,
    management_url: String,
    credentials: Credentials,
    page_size: usize,
}

impl ContentstackClient {
    pub fn new(settings: &ApiSettings, credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            delivery_url: settings.delivery_url.trim_end_matches('/').to_string(),
            management_url: settings.management_url.trim_end_matches('/').to_string(),
            credentials,
            page_size: settings.page_size.max(1),
        })
    }

    fn delivery_get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}/{}", self.delivery_url, path))
            .header("api_key", &self.credentials.api_key)
            .header("access_token", &self.credentials.delivery_token)
    }

    /// Follows `skip`/`limit` until the reported count is reached or a short
    /// page comes back.
    async fn fetch_all<P: Page>(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<P::Item>> {
        let mut items = Vec::new();
        let mut skip = 0usize;

        loop {
            tracing::debug!(path, skip, limit = self.page_size, "Fetching page");
            let response = self
                .delivery_get(path)
                .query(query)
                .query(&[
                    ("include_count", "true".to_string()),
                    ("skip", skip.to_string()),
                    ("limit", self.page_size.to_string()),
                ])
                .send()
                .await?;

            let page: P = parse_response(response).await?;
            let (batch, count) = page.into_parts();
            let received = batch.len();
            items.extend(batch);
            skip += received;

            let reached_count = count.is_some_and(|total| skip >= total);
            if received == 0 || received < self.page_size || reached_count {
                break;
            }
        }

        Ok(items)
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    let body = if body.trim().is_empty() { "{}" } else { body.as_str() };

    if status.is_success() {
        let value: serde_json::Value = serde_json::from_str(body)?;
        let payload: ErrorPayload = serde_json::from_value(value.clone()).unwrap_or_default();
        if payload.is_rate_limit() {
            return Err(CmsError::RateLimitError {
                message: payload.message(),
            });
        }
        if payload.is_error() {
            return Err(CmsError::ApiResponseError {
                status: status.as_u16(),
                message: payload.message(),
            });
        }
        return Ok(serde_json::from_value(value)?);
    }

    let payload: ErrorPayload = serde_json::from_str(body).unwrap_or_default();
    if status == StatusCode::TOO_MANY_REQUESTS || payload.is_rate_limit() {
        return Err(CmsError::RateLimitError {
            message: payload.message(),
        });
    }

    Err(CmsError::ApiResponseError {
        status: status.as_u16(),
        message: payload.message(),
    })
}

#[async_trait]
impl CmsClient for ContentstackClient {
    async fn list_content_types(&self) -> Result<Vec<ContentType>> {
        self.fetch_all::<ContentTypesPage>("content_types", &[]).await
    }

    async fn list_entries(&self, content_type: &str, query: &EntryQuery) -> Result<Vec<Entry>> {
        let mut params = vec![("environment", query.environment.clone())];
        if let Some(before) = query.created_before {
            let filter = serde_json::json!({
                "created_at": { "$lt": before.to_rfc3339_opts(SecondsFormat::Millis, true) }
            });
            params.push(("query", filter.to_string()));
        }

        let path = format!("content_types/{}/entries", content_type);
        self.fetch_all::<EntriesPage>(&path, &params).await
    }

    async fn unpublish(&self, request: &UnpublishRequest) -> Result<UnpublishAck> {
        let management_token = self.credentials.management_token.as_deref().ok_or_else(|| {
            CmsError::MissingConfigError {
                field: crate::config::MANAGEMENT_TOKEN_VAR.to_string(),
            }
        })?;

        let url = format!(
            "{}/content_types/{}/entries/{}/unpublish",
            self.management_url, request.content_type_uid, request.entry_uid
        );
        tracing::debug!(url = %url, "Sending unpublish request");

        let response = self
            .client
            .post(url)
            .header("api_key", &self.credentials.api_key)
            .header("authorization", management_token)
            .json(&request.body())
            .send()
            .await?;

        parse_response(response).await
    }
}
