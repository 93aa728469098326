//! In-process remote store with a push change feed.
//!
//! Several orchestrators sharing one `MemoryRemote` behave like several
//! devices sharing one hosted backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::warn;

use crate::error::{SyncError, SyncResult};
use crate::remote::{ChangeCallback, RemoteStore, Subscription};
use crate::schedule::ScheduleDocument;

const FEED_CAPACITY: usize = 64;

pub struct MemoryRemote {
    rows: Mutex<HashMap<String, ScheduleDocument>>,
    changes: broadcast::Sender<(String, ScheduleDocument)>,
    unreachable: AtomicBool,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(FEED_CAPACITY);
        MemoryRemote {
            rows: Mutex::new(HashMap::new()),
            changes,
            unreachable: AtomicBool::new(false),
        }
    }
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the backend could not be reached.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Current row for `couple_key`, bypassing reachability.
    pub fn row(&self, couple_key: &str) -> Option<ScheduleDocument> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(couple_key)
            .cloned()
    }

    fn check_reachable(&self) -> SyncResult<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(SyncError::Remote("backend unreachable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn fetch(&self, couple_key: &str) -> SyncResult<Option<ScheduleDocument>> {
        self.check_reachable()?;
        Ok(self.row(couple_key))
    }

    async fn upsert(&self, couple_key: &str, doc: &ScheduleDocument) -> SyncResult<()> {
        self.check_reachable()?;
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(couple_key.to_string(), doc.clone());

        // No receivers is fine
        let _ = self.changes.send((couple_key.to_string(), doc.clone()));
        Ok(())
    }

    async fn subscribe(
        &self,
        couple_key: &str,
        on_change: ChangeCallback,
    ) -> SyncResult<Subscription> {
        self.check_reachable()?;

        let mut feed = self.changes.subscribe();
        let (subscription, sink) = Subscription::new(on_change);
        let couple_key = couple_key.to_string();

        let task = tokio::spawn(async move {
            loop {
                match feed.recv().await {
                    Ok((key, doc)) if key == couple_key => {
                        if !sink.deliver(doc) {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "change feed lagged, dropped updates");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        subscription.attach(task);

        Ok(subscription)
    }
}
