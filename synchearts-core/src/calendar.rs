//! The in-memory schedule of an active session.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::remote::Subscription;
use crate::schedule::{DaySchedule, ScheduleDocument};
use crate::sync::{LoadSource, SyncOrchestrator};

/// One couple's document as seen by this device.
///
/// The document lives in a watch channel so front-ends can re-render on every
/// change, local or remote. While syncing, remote updates replace it
/// wholesale.
pub struct SharedCalendar {
    orchestrator: SyncOrchestrator,
    couple_key: String,
    source: LoadSource,
    state: Arc<watch::Sender<ScheduleDocument>>,
    subscription: Option<Subscription>,
}

impl SharedCalendar {
    /// Load the document and fill the rolling window.
    pub async fn open(orchestrator: SyncOrchestrator, couple_key: &str) -> Self {
        let loaded = orchestrator.open(couple_key).await;
        let (state, _) = watch::channel(loaded.document);

        SharedCalendar {
            orchestrator,
            couple_key: couple_key.to_string(),
            source: loaded.source,
            state: Arc::new(state),
            subscription: None,
        }
    }

    /// Where the last load came from.
    pub fn source(&self) -> LoadSource {
        self.source
    }

    pub fn orchestrator(&self) -> &SyncOrchestrator {
        &self.orchestrator
    }

    pub fn document(&self) -> ScheduleDocument {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<ScheduleDocument> {
        self.state.subscribe()
    }

    /// Replace one day. The in-memory view changes before anything is
    /// persisted and is never rolled back.
    pub async fn update_day(&self, day: DaySchedule) -> ScheduleDocument {
        let current = self.document();
        self.state.send_replace(current.with_day(day.clone()));

        self.orchestrator
            .update_day(&self.couple_key, &current, day)
            .await
    }

    pub fn apply_remote_change(&self, inbound: ScheduleDocument) {
        self.state
            .send_replace(self.orchestrator.on_remote_change(inbound));
    }

    /// Follow remote changes, replacing any earlier subscription.
    pub async fn start_sync(&mut self) {
        self.stop_sync();

        let state = self.state.clone();
        let orchestrator = self.orchestrator.clone();
        let subscription = self
            .orchestrator
            .subscribe(
                &self.couple_key,
                Box::new(move |inbound| {
                    state.send_replace(orchestrator.on_remote_change(inbound));
                }),
            )
            .await;

        debug!(active = subscription.is_active(), "remote sync started");
        self.subscription = Some(subscription);
    }

    pub fn is_syncing(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|s| s.is_active())
    }

    pub fn stop_sync(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    /// Stop syncing and drop the in-memory document.
    pub fn close(mut self) {
        self.stop_sync();
    }
}

impl Drop for SharedCalendar {
    fn drop(&mut self) {
        self.stop_sync();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LEGACY_WINDOW_DAYS;
    use crate::local::LocalStore;
    use crate::remote::{MemoryRemote, RemoteMirror};
    use crate::schedule::{AvailabilityStatus, TimeBucket, empty_day, today, upcoming_date_keys};
    use std::time::Duration;

    fn device(remote: &Arc<MemoryRemote>) -> SyncOrchestrator {
        SyncOrchestrator::new(LocalStore::in_memory(), RemoteMirror::new(remote.clone()))
            .with_window_days(LEGACY_WINDOW_DAYS)
    }

    #[tokio::test]
    async fn test_open_fills_window() {
        let orchestrator = SyncOrchestrator::new(LocalStore::in_memory(), RemoteMirror::disabled())
            .with_window_days(LEGACY_WINDOW_DAYS);
        let calendar = SharedCalendar::open(orchestrator, "abc123").await;

        assert_eq!(calendar.source(), LoadSource::LocalOnly);
        assert_eq!(calendar.document().len(), 7);
        assert!(!calendar.is_syncing());
    }

    #[tokio::test]
    async fn test_update_day_notifies_watchers() {
        let remote = Arc::new(MemoryRemote::new());
        let calendar = SharedCalendar::open(device(&remote), "abc123").await;
        let mut watcher = calendar.watch();

        let day = empty_day(today()).with_status(TimeBucket::Morning, AvailabilityStatus::Free);
        let updated = calendar.update_day(day.clone()).await;

        assert!(watcher.has_changed().unwrap());
        assert_eq!(*watcher.borrow_and_update(), updated);
        assert_eq!(updated.get(&today()), Some(&day));
    }

    #[tokio::test]
    async fn test_remote_edit_reaches_other_device() {
        let remote = Arc::new(MemoryRemote::new());
        let mut planner = SharedCalendar::open(device(&remote), "abc123").await;
        let sharer = SharedCalendar::open(device(&remote), "abc123").await;
        planner.start_sync().await;
        assert!(planner.is_syncing());

        let mut watcher = planner.watch();
        let day = empty_day(today()).with_mood(88);
        let updated = sharer.update_day(day).await;

        tokio::time::timeout(Duration::from_secs(1), watcher.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(planner.document(), updated);
    }

    #[tokio::test]
    async fn test_stopped_sync_ignores_remote_edits() {
        let remote = Arc::new(MemoryRemote::new());
        let mut planner = SharedCalendar::open(device(&remote), "abc123").await;
        let sharer = SharedCalendar::open(device(&remote), "abc123").await;
        planner.start_sync().await;
        planner.stop_sync();

        let before = planner.document();
        sharer.update_day(empty_day(today()).with_mood(1)).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(planner.document(), before);
        assert!(!planner.is_syncing());
    }

    #[tokio::test]
    async fn test_remote_change_replaces_document() {
        let remote = Arc::new(MemoryRemote::new());
        let calendar = SharedCalendar::open(device(&remote), "abc123").await;
        assert_eq!(calendar.document().len(), 7);

        let inbound =
            ScheduleDocument::from_days(upcoming_date_keys(5).into_iter().map(empty_day));
        calendar.apply_remote_change(inbound.clone());

        assert_eq!(calendar.document(), inbound);
    }
}
