use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, header::AUTHORIZATION};
use tracing::{debug, instrument};

use super::{Collection, RecordFilter, RemoteStore, SyncFailure, SyncOutcome};

/// Upper bound for a single request. A slow store delays the next sample by at most this much.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// [RemoteStore] speaking the PostgREST dialect used by the store: rows are created with `POST
/// /rest/v1/<collection>` and patched with `PATCH /rest/v1/<collection>?<column>=eq.<value>`.
pub struct RestGateway {
    base_url: String,
    key: String,
    client: reqwest::Client,
}

impl RestGateway {
    pub fn new(base_url: &str, key: &str) -> Result<Self> {
        Self::with_timeout(base_url, key, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            client,
        })
    }

    pub fn collection_url(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection.as_str())
    }

    /// Credentials go on every call, and the store is asked not to echo rows back.
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.key)
            .header(AUTHORIZATION, format!("Bearer {}", self.key))
            .header("Prefer", "return=minimal")
    }

    async fn execute(request: RequestBuilder) -> SyncOutcome {
        match request.send().await {
            Ok(response) => {
                let status = response.status();
                debug!("Store responded with {status}");
                if status.is_success() {
                    SyncOutcome::Success {
                        status: status.as_u16(),
                    }
                } else {
                    SyncOutcome::Failure(SyncFailure::Status(status.as_u16()))
                }
            }
            Err(e) if e.is_timeout() => SyncOutcome::Failure(SyncFailure::Timeout),
            Err(e) => SyncOutcome::Failure(SyncFailure::Connection(e.to_string())),
        }
    }
}

#[async_trait]
impl RemoteStore for RestGateway {
    #[instrument(skip(self, payload))]
    async fn create_record(
        &self,
        collection: Collection,
        payload: serde_json::Value,
    ) -> SyncOutcome {
        let request = self
            .client
            .post(self.collection_url(collection))
            .json(&payload);
        Self::execute(self.authorized(request)).await
    }

    #[instrument(skip(self, payload))]
    async fn patch_record(
        &self,
        collection: Collection,
        filter: RecordFilter,
        payload: serde_json::Value,
    ) -> SyncOutcome {
        let request = self
            .client
            .patch(self.collection_url(collection))
            .query(&[filter.query_pair()])
            .json(&payload);
        Self::execute(self.authorized(request)).await
    }
}
