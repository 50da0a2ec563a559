use std::{fmt::Display, sync::Arc};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One finished interval during which a single window was in the foreground. Sent once to the
/// usage log and never updated.
#[derive(PartialEq, Eq, Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UsageEvent {
    pub engineer_id: Arc<str>,
    pub active_window: Arc<str>,
    pub duration_seconds: u64,
    #[serde(with = "timestamp_ser")]
    pub timestamp: DateTime<Utc>,
}

#[derive(PartialEq, Eq, Debug, Serialize, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Work,
    Break,
}

impl Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryType::Work => write!(f, "work"),
            EntryType::Break => write!(f, "break"),
        }
    }
}

/// A contiguous span of work or break time. Only `end_time` is ever updated remotely, through
/// [EndTimePatch].
#[derive(PartialEq, Eq, Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: Uuid,
    pub engineer_id: Arc<str>,
    pub entry_type: EntryType,
    #[serde(with = "timestamp_ser")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "timestamp_ser")]
    pub end_time: DateTime<Utc>,
    #[serde(with = "timestamp_ser")]
    pub created_at: DateTime<Utc>,
}

impl TimeEntry {
    /// Creates an entry with a fresh identifier that starts, ends and is created at `now`.
    pub fn open(engineer_id: Arc<str>, entry_type: EntryType, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            engineer_id,
            entry_type,
            start_time: now,
            end_time: now,
            created_at: now,
        }
    }
}

#[derive(PartialEq, Eq, Debug, Serialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct EndTimePatch {
    #[serde(with = "timestamp_ser")]
    pub end_time: DateTime<Utc>,
}

/// Timestamps go over the wire as ISO-8601 UTC with millisecond precision, e.g.
/// `2024-03-01T08:30:00.000Z`.
mod timestamp_ser {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::Serializer;

    pub fn serialize<S>(moment: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&moment.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}
