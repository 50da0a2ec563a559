//! All state that survives between ticks lives in [TrackerSession]. The poll loop owns the
//! session and hands it a sample and a store on every tick.

pub mod activity_state;
pub mod window_tracker;

use std::sync::Arc;

use activity_state::{ActivityStateMachine, EntryAction, classify};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use window_tracker::WindowSessionTracker;

use crate::{
    daemon::{
        classifier::is_work_app,
        collection::afk::AfkEvaluator,
        sync::{
            self, Collection, RecordFilter, RemoteStore, SyncOutcome,
            records::{EndTimePatch, EntryType, UsageEvent},
        },
    },
    sampler::Sample,
};

/// What a single tick observed and wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub idle: bool,
    pub work_app: bool,
    pub derived: EntryType,
    pub usage_sync: Option<SyncOutcome>,
    pub entry_sync: Option<SyncOutcome>,
}

pub struct TrackerSession {
    afk_evaluator: AfkEvaluator,
    windows: WindowSessionTracker,
    activity: ActivityStateMachine,
}

impl TrackerSession {
    pub fn new(engineer_id: Arc<str>, afk_evaluator: AfkEvaluator, now: DateTime<Utc>) -> Self {
        Self {
            afk_evaluator,
            windows: WindowSessionTracker::new(engineer_id.clone(), now),
            activity: ActivityStateMachine::new(engineer_id),
        }
    }

    pub fn current_state(&self) -> Option<EntryType> {
        self.activity.current_state()
    }

    pub fn current_entry_id(&self) -> Option<uuid::Uuid> {
        self.activity.current_entry_id()
    }

    /// Runs one iteration: window tracking first, then the time entry state.
    pub async fn tick(
        &mut self,
        sample: &Sample,
        now: DateTime<Utc>,
        store: &dyn RemoteStore,
    ) -> TickReport {
        let idle = self.afk_evaluator.is_afk(sample.idle_ms);
        let work_app = is_work_app(&sample.window_title);

        let usage_sync = match self.windows.observe(&sample.window_title, idle, now) {
            Some(event) => Some(send_usage_event(store, &event).await),
            None => None,
        };

        let derived = classify(idle, work_app);
        let entry_sync = match self.activity.plan(derived, now) {
            Some(EntryAction::Open(entry)) => {
                let outcome = sync::create(store, Collection::TimeEntries, &entry).await;
                match &outcome {
                    SyncOutcome::Success { .. } => {
                        info!("Started {} entry {}", entry.entry_type, entry.id);
                        self.activity.confirm_open(&entry);
                    }
                    SyncOutcome::Failure(reason) => {
                        warn!("Failed to start {} entry, retrying next tick: {reason}", derived)
                    }
                }
                Some(outcome)
            }
            Some(EntryAction::Extend { id, end_time }) => {
                let outcome = sync::patch(
                    store,
                    Collection::TimeEntries,
                    RecordFilter::id_eq(id),
                    &EndTimePatch { end_time },
                )
                .await;
                match &outcome {
                    SyncOutcome::Success { .. } => debug!("Extended entry {id} to {end_time}"),
                    SyncOutcome::Failure(reason) => warn!("Failed to extend entry {id}: {reason}"),
                }
                Some(outcome)
            }
            None => None,
        };

        TickReport {
            idle,
            work_app,
            derived,
            usage_sync,
            entry_sync,
        }
    }

    /// Reports the window that is open when tracking stops.
    pub async fn close(
        &mut self,
        now: DateTime<Utc>,
        store: &dyn RemoteStore,
    ) -> Option<SyncOutcome> {
        let event = self.windows.close(now)?;
        Some(send_usage_event(store, &event).await)
    }
}

async fn send_usage_event(store: &dyn RemoteStore, event: &UsageEvent) -> SyncOutcome {
    let outcome = sync::create(store, Collection::UsageLog, event).await;
    match &outcome {
        SyncOutcome::Success { .. } => info!(
            "Logged {}s in {:?}",
            event.duration_seconds, event.active_window
        ),
        SyncOutcome::Failure(reason) => warn!(
            "Dropped usage event for {:?}: {reason}",
            event.active_window
        ),
    }
    outcome
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{Duration, TimeZone};
    use mockall::{Sequence, predicate::eq};

    use super::*;
    use crate::daemon::sync::{MockRemoteStore, SyncFailure};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn sample(idle_ms: u32, window_title: &str) -> Sample {
        Sample {
            idle_ms,
            window_title: window_title.into(),
        }
    }

    fn session() -> TrackerSession {
        TrackerSession::new("eng-42".into(), AfkEvaluator::default(), start())
    }

    const IDLE: u32 = 6 * 60 * 1000;

    #[tokio::test]
    async fn idle_user_is_on_break_regardless_of_window() {
        let mut store = MockRemoteStore::new();
        store
            .expect_create_record()
            .withf(|collection, payload| {
                *collection == Collection::TimeEntries && payload["entryType"] == "break"
            })
            .times(1)
            .returning(|_, _| SyncOutcome::Success { status: 201 });

        let mut session = session();
        let report = session.tick(&sample(IDLE, "AutoCAD"), start(), &store).await;

        assert!(report.idle);
        assert!(report.work_app);
        assert_eq!(report.derived, EntryType::Break);
        assert_eq!(session.current_state(), Some(EntryType::Break));
    }

    #[tokio::test]
    async fn active_user_outside_work_apps_is_on_break() {
        let mut store = MockRemoteStore::new();
        store
            .expect_create_record()
            .returning(|_, _| SyncOutcome::Success { status: 201 });

        let mut session = session();
        let report = session.tick(&sample(0, "Solitaire"), start(), &store).await;

        assert_eq!(report.derived, EntryType::Break);
        assert!(!report.idle);
    }

    #[tokio::test]
    async fn failed_creation_is_retried_with_new_id() {
        let ids = Arc::new(Mutex::new(Vec::<String>::new()));
        let mut store = MockRemoteStore::new();
        let mut sequence = Sequence::new();
        for outcome in [
            SyncOutcome::Failure(SyncFailure::Timeout),
            SyncOutcome::Success { status: 201 },
        ] {
            let ids = ids.clone();
            store
                .expect_create_record()
                .with(eq(Collection::TimeEntries), mockall::predicate::always())
                .times(1)
                .in_sequence(&mut sequence)
                .returning(move |_, payload| {
                    ids.lock().unwrap().push(payload["id"].as_str().unwrap().to_string());
                    outcome.clone()
                });
        }

        let mut session = session();
        let first = session.tick(&sample(0, "Excel"), start(), &store).await;
        assert_eq!(first.entry_sync, Some(SyncOutcome::Failure(SyncFailure::Timeout)));
        assert_eq!(session.current_state(), None);
        assert_eq!(session.current_entry_id(), None);

        let later = start() + Duration::seconds(10);
        session.tick(&sample(0, "Excel"), later, &store).await;
        assert_eq!(session.current_state(), Some(EntryType::Work));

        let ids = ids.lock().unwrap();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(session.current_entry_id().unwrap().to_string(), ids[1]);
    }

    #[tokio::test]
    async fn failed_heartbeat_is_not_retried() {
        let mut store = MockRemoteStore::new();
        store
            .expect_create_record()
            .times(1)
            .returning(|_, _| SyncOutcome::Success { status: 201 });
        store
            .expect_patch_record()
            .times(1)
            .returning(|_, _, _| SyncOutcome::Failure(SyncFailure::Status(503)));

        let mut session = session();
        for seconds in (0..=120).step_by(10) {
            let now = start() + Duration::seconds(seconds);
            session.tick(&sample(0, "Revit"), now, &store).await;
        }
    }

    #[tokio::test]
    async fn window_change_logs_usage_before_touching_entries() {
        let mut store = MockRemoteStore::new();
        let mut sequence = Sequence::new();
        store
            .expect_create_record()
            .withf(|collection, _| *collection == Collection::TimeEntries)
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| SyncOutcome::Success { status: 201 });
        store
            .expect_create_record()
            .withf(|collection, payload| {
                *collection == Collection::UsageLog
                    && payload["engineerId"] == "eng-42"
                    && payload["activeWindow"] == "AutoCAD"
                    && payload["durationSeconds"] == 30
            })
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| SyncOutcome::Success { status: 201 });
        store
            .expect_create_record()
            .withf(|collection, payload| {
                *collection == Collection::TimeEntries && payload["entryType"] == "break"
            })
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| SyncOutcome::Success { status: 201 });

        let mut session = session();
        session.tick(&sample(0, "AutoCAD"), start(), &store).await;
        let report = session
            .tick(&sample(0, "Notepad"), start() + Duration::seconds(30), &store)
            .await;

        assert_eq!(report.usage_sync, Some(SyncOutcome::Success { status: 201 }));
        assert_eq!(session.current_state(), Some(EntryType::Break));
    }

    #[tokio::test]
    async fn close_reports_open_window() {
        let mut store = MockRemoteStore::new();
        store
            .expect_create_record()
            .withf(|collection, _| *collection == Collection::TimeEntries)
            .returning(|_, _| SyncOutcome::Success { status: 201 });
        store
            .expect_create_record()
            .withf(|collection, payload| {
                *collection == Collection::UsageLog && payload["durationSeconds"] == 45
            })
            .times(1)
            .returning(|_, _| SyncOutcome::Success { status: 201 });

        let mut session = session();
        session.tick(&sample(0, "SketchUp"), start(), &store).await;
        let outcome = session.close(start() + Duration::seconds(45), &store).await;

        assert_eq!(outcome, Some(SyncOutcome::Success { status: 201 }));
    }
}
