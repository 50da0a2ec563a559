use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::daemon::sync::records::{EntryType, TimeEntry};

/// Minimum time between two `endTime` extensions of the same entry.
pub const HEARTBEAT_INTERVAL_SECONDS: i64 = 60;

/// Idle wins over everything, an active user counts as working only inside a work application.
pub fn classify(is_idle: bool, is_work_app: bool) -> EntryType {
    if is_idle {
        EntryType::Break
    } else if is_work_app {
        EntryType::Work
    } else {
        EntryType::Break
    }
}

/// What has to be written to keep the remote time entries in line with the derived state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryAction {
    /// Create a new entry. Confirm it with [ActivityStateMachine::confirm_open] once the store
    /// accepted it.
    Open(TimeEntry),
    /// Move the end of the current entry forward.
    Extend { id: Uuid, end_time: DateTime<Utc> },
}

#[derive(Debug, Clone, Copy)]
struct CurrentEntry {
    entry_type: EntryType,
    id: Uuid,
    last_heartbeat: DateTime<Utc>,
}

/// Keeps track of the single time entry that is currently being extended. Entries are never
/// closed explicitly: a transition opens a new entry and the last extension of the old one
/// stands as its end.
pub struct ActivityStateMachine {
    engineer_id: Arc<str>,
    current: Option<CurrentEntry>,
}

impl ActivityStateMachine {
    pub fn new(engineer_id: Arc<str>) -> Self {
        Self {
            engineer_id,
            current: None,
        }
    }

    pub fn current_state(&self) -> Option<EntryType> {
        self.current.map(|v| v.entry_type)
    }

    pub fn current_entry_id(&self) -> Option<Uuid> {
        self.current.map(|v| v.id)
    }

    /// Decides the write for this tick.
    ///
    /// Extensions reset the heartbeat immediately, whether or not the write lands. Opening does
    /// not change anything until [Self::confirm_open], so an unconfirmed open is planned again
    /// (with a new id) on the next tick.
    pub fn plan(&mut self, derived: EntryType, now: DateTime<Utc>) -> Option<EntryAction> {
        match &mut self.current {
            Some(current) if current.entry_type == derived => {
                if now - current.last_heartbeat > Duration::seconds(HEARTBEAT_INTERVAL_SECONDS) {
                    current.last_heartbeat = now;
                    Some(EntryAction::Extend {
                        id: current.id,
                        end_time: now,
                    })
                } else {
                    None
                }
            }
            _ => Some(EntryAction::Open(TimeEntry::open(
                self.engineer_id.clone(),
                derived,
                now,
            ))),
        }
    }

    /// Makes `entry` the current one after the store acknowledged its creation.
    pub fn confirm_open(&mut self, entry: &TimeEntry) {
        self.current = Some(CurrentEntry {
            entry_type: entry.entry_type,
            id: entry.id,
            last_heartbeat: entry.created_at,
        });
    }
}
