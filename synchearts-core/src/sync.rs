//! Loading, persisting and merging the shared schedule document.
//!
//! Persistence is always local first, remote best effort. Remote updates
//! replace the whole document: the last write received wins, and concurrent
//! edits from two devices can overwrite each other.

use chrono::NaiveDate;
use tracing::{debug, error, info};

use crate::constants::DEFAULT_WINDOW_DAYS;
use crate::local::LocalStore;
use crate::remote::{ChangeCallback, RemoteMirror, Subscription};
use crate::schedule::{DaySchedule, ScheduleDocument, empty_day, upcoming_date_keys};

/// Where a load got its document from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Remote had the document; it was cached locally.
    RemoteHit,
    /// Remote is configured but had nothing or failed; local copy used.
    RemoteMissFallback,
    /// No remote configured.
    LocalOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub document: ScheduleDocument,
    pub source: LoadSource,
}

/// Role-agnostic: it applies any update it is given.
#[derive(Clone)]
pub struct SyncOrchestrator {
    local: LocalStore,
    remote: RemoteMirror,
    window_days: usize,
}

impl SyncOrchestrator {
    pub fn new(local: LocalStore, remote: RemoteMirror) -> Self {
        SyncOrchestrator {
            local,
            remote,
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    pub fn with_window_days(mut self, window_days: usize) -> Self {
        self.window_days = window_days;
        self
    }

    pub fn window_days(&self) -> usize {
        self.window_days
    }

    pub fn remote(&self) -> &RemoteMirror {
        &self.remote
    }

    /// Dates of the rolling window, starting today.
    pub fn window(&self) -> Vec<NaiveDate> {
        upcoming_date_keys(self.window_days)
    }

    pub async fn load(&self, couple_key: &str) -> Loaded {
        if !self.remote.is_configured() {
            return Loaded {
                document: self.local.load_local(couple_key),
                source: LoadSource::LocalOnly,
            };
        }

        match self.remote.fetch_remote(couple_key).await {
            Some(document) => {
                self.save_local(couple_key, &document);
                info!(days = document.len(), "loaded schedule from remote");
                Loaded {
                    document,
                    source: LoadSource::RemoteHit,
                }
            }
            None => {
                info!("remote had no schedule, using local copy");
                Loaded {
                    document: self.local.load_local(couple_key),
                    source: LoadSource::RemoteMissFallback,
                }
            }
        }
    }

    /// Load, then fill the rolling window.
    pub async fn open(&self, couple_key: &str) -> Loaded {
        let loaded = self.load(couple_key).await;
        let document = self
            .ensure_upcoming_days(loaded.document, couple_key)
            .await;
        Loaded {
            document,
            source: loaded.source,
        }
    }

    /// Insert a default day for every missing date of the window. Persists
    /// only if something was inserted.
    pub async fn ensure_upcoming_days(
        &self,
        doc: ScheduleDocument,
        couple_key: &str,
    ) -> ScheduleDocument {
        let missing: Vec<NaiveDate> = self
            .window()
            .into_iter()
            .filter(|date| !doc.contains(date))
            .collect();

        if missing.is_empty() {
            return doc;
        }

        let mut doc = doc;
        for date in &missing {
            doc.insert(empty_day(*date));
        }
        debug!(added = missing.len(), "filled upcoming days");

        self.persist(couple_key, &doc).await;
        doc
    }

    /// New document with `day` replacing the entry at `day.date`.
    ///
    /// Optimistic: the returned document is final even if the remote write
    /// fails.
    pub async fn update_day(
        &self,
        couple_key: &str,
        doc: &ScheduleDocument,
        day: DaySchedule,
    ) -> ScheduleDocument {
        let updated = doc.with_day(day);
        self.persist(couple_key, &updated).await;
        updated
    }

    /// The inbound document, verbatim.
    pub fn on_remote_change(&self, inbound: ScheduleDocument) -> ScheduleDocument {
        debug!(days = inbound.len(), "replacing schedule with remote version");
        inbound
    }

    pub async fn subscribe(&self, couple_key: &str, on_change: ChangeCallback) -> Subscription {
        self.remote.subscribe(couple_key, on_change).await
    }

    async fn persist(&self, couple_key: &str, doc: &ScheduleDocument) {
        self.save_local(couple_key, doc);
        self.remote.upsert_remote(couple_key, doc).await;
    }

    fn save_local(&self, couple_key: &str, doc: &ScheduleDocument) {
        if let Err(e) = self.local.save_local(couple_key, doc) {
            error!(error = %e, "could not save schedule locally");
        }
    }
}
