//! Write-only synchronization with the remote record store.
//!  - [RemoteStore] is the transport seam, [gateway::RestGateway] is the REST implementation.
//!  - Every call produces a [SyncOutcome]. Failures are values, never errors, so the caller
//!    decides what to do with them (usually: log and move on).

pub mod gateway;
pub mod records;

use std::fmt::Display;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// Append-only usage events.
    UsageLog,
    /// Time entries, created once and then patched by id.
    TimeEntries,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::UsageLog => "app_usage_log",
            Collection::TimeEntries => "time_entries",
        }
    }
}

/// Equality filter selecting the rows a patch applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    column: &'static str,
    value: String,
}

impl RecordFilter {
    pub fn id_eq(id: impl Display) -> Self {
        Self {
            column: "id",
            value: id.to_string(),
        }
    }

    /// Query parameter in the `column=eq.value` form the store understands.
    pub fn query_pair(&self) -> (&'static str, String) {
        (self.column, format!("eq.{}", self.value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncFailure {
    Timeout,
    Connection(String),
    Status(u16),
    Serialization(String),
}

impl Display for SyncFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncFailure::Timeout => write!(f, "request timed out"),
            SyncFailure::Connection(msg) => write!(f, "connection error: {msg}"),
            SyncFailure::Status(status) => write!(f, "store answered with status {status}"),
            SyncFailure::Serialization(msg) => write!(f, "payload serialization failed: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Success { status: u16 },
    Failure(SyncFailure),
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Success { .. })
    }
}

/// Interface for abstracting the remote store. Implementations perform exactly one attempt per
/// call and report its outcome.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn create_record(
        &self,
        collection: Collection,
        payload: serde_json::Value,
    ) -> SyncOutcome;

    async fn patch_record(
        &self,
        collection: Collection,
        filter: RecordFilter,
        payload: serde_json::Value,
    ) -> SyncOutcome;
}

/// Serializes `record` and creates it in `collection`.
pub async fn create<T: Serialize>(
    store: &dyn RemoteStore,
    collection: Collection,
    record: &T,
) -> SyncOutcome {
    match serde_json::to_value(record) {
        Ok(payload) => store.create_record(collection, payload).await,
        Err(e) => SyncOutcome::Failure(SyncFailure::Serialization(e.to_string())),
    }
}

/// Serializes `changes` and applies them to the rows of `collection` matching `filter`.
pub async fn patch<T: Serialize>(
    store: &dyn RemoteStore,
    collection: Collection,
    filter: RecordFilter,
    changes: &T,
) -> SyncOutcome {
    match serde_json::to_value(changes) {
        Ok(payload) => store.patch_record(collection, filter, payload).await,
        Err(e) => SyncOutcome::Failure(SyncFailure::Serialization(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn filter_renders_as_equality_query() {
        let filter = RecordFilter::id_eq("5f0c");
        assert_eq!(filter.query_pair(), ("id", "eq.5f0c".to_string()));
    }

    #[tokio::test]
    async fn create_serializes_record_before_sending() {
        let mut store = MockRemoteStore::new();
        store
            .expect_create_record()
            .with(eq(Collection::UsageLog), eq(json!({ "durationSeconds": 12 })))
            .times(1)
            .returning(|_, _| SyncOutcome::Success { status: 201 });

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Payload {
            duration_seconds: u64,
        }

        let outcome = create(&store, Collection::UsageLog, &Payload { duration_seconds: 12 }).await;
        assert_eq!(outcome, SyncOutcome::Success { status: 201 });
    }

    #[tokio::test]
    async fn patch_forwards_filter() {
        let mut store = MockRemoteStore::new();
        store
            .expect_patch_record()
            .withf(|collection, filter, payload| {
                *collection == Collection::TimeEntries
                    && *filter == RecordFilter::id_eq("abc")
                    && payload["endTime"] == "now"
            })
            .times(1)
            .returning(|_, _, _| SyncOutcome::Failure(SyncFailure::Timeout));

        let outcome = patch(
            &store,
            Collection::TimeEntries,
            RecordFilter::id_eq("abc"),
            &json!({ "endTime": "now" }),
        )
        .await;
        assert_eq!(outcome, SyncOutcome::Failure(SyncFailure::Timeout));
    }
}
