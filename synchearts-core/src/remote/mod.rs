//! Optional remote mirror of the schedule document.
//!
//! [`RemoteStore`] is the capability every backend implements, with honest
//! `Result`s. [`RemoteMirror`] is what the rest of the crate talks to: it
//! turns every remote failure into a log line, because remote sync is best
//! effort and the local store is what keeps data safe.

mod config;
mod memory;
mod null;
mod rest;
mod subscription;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

pub use config::RemoteConfig;
pub use memory::MemoryRemote;
pub use null::NoRemote;
pub use rest::RestRemote;
pub use subscription::{ChangeCallback, ChangeSink, Subscription};

use crate::error::SyncResult;
use crate::schedule::ScheduleDocument;

/// A remote document store keyed by couple key, with a change feed.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    fn is_configured(&self) -> bool {
        true
    }

    /// `Ok(None)` when nothing is stored for `couple_key`.
    async fn fetch(&self, couple_key: &str) -> SyncResult<Option<ScheduleDocument>>;

    /// Insert or replace the document for `couple_key`.
    async fn upsert(&self, couple_key: &str, doc: &ScheduleDocument) -> SyncResult<()>;

    /// Call `on_change` with the full document on every remote update for
    /// `couple_key`, until the returned subscription is dropped or
    /// unsubscribed.
    async fn subscribe(
        &self,
        couple_key: &str,
        on_change: ChangeCallback,
    ) -> SyncResult<Subscription>;
}

/// Best-effort wrapper around a [`RemoteStore`].
#[derive(Clone)]
pub struct RemoteMirror {
    store: Arc<dyn RemoteStore>,
}

impl RemoteMirror {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        RemoteMirror { store }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(NoRemote))
    }

    /// HTTP mirror for `config`, or a disabled one when there is no config or
    /// it cannot be used.
    pub fn from_config(config: Option<&RemoteConfig>, poll_interval: Duration) -> Self {
        let Some(config) = config else {
            return Self::disabled();
        };

        match RestRemote::new(config, poll_interval) {
            Ok(remote) => Self::new(Arc::new(remote)),
            Err(e) => {
                warn!(error = %e, "remote config unusable, continuing local-only");
                Self::disabled()
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_configured()
    }

    /// Remote document, or `None` when missing or unreachable.
    pub async fn fetch_remote(&self, couple_key: &str) -> Option<ScheduleDocument> {
        match self.store.fetch(couple_key).await {
            Ok(Some(doc)) => Some(doc),
            Ok(None) => {
                debug!("no remote schedule yet");
                None
            }
            Err(e) => {
                warn!(error = %e, "remote fetch failed");
                None
            }
        }
    }

    pub async fn upsert_remote(&self, couple_key: &str, doc: &ScheduleDocument) {
        if let Err(e) = self.store.upsert(couple_key, doc).await {
            warn!(error = %e, "remote save failed");
        }
    }

    /// Subscription to remote changes; inert if subscribing failed.
    pub async fn subscribe(&self, couple_key: &str, on_change: ChangeCallback) -> Subscription {
        match self.store.subscribe(couple_key, on_change).await {
            Ok(subscription) => subscription,
            Err(e) => {
                warn!(error = %e, "could not subscribe to remote changes");
                Subscription::inert()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{empty_day, today};

    #[tokio::test]
    async fn test_disabled_mirror() {
        let mirror = RemoteMirror::disabled();
        assert!(!mirror.is_configured());
        assert_eq!(mirror.fetch_remote("abc123").await, None);

        mirror.upsert_remote("abc123", &ScheduleDocument::new()).await;
        let subscription = mirror.subscribe("abc123", Box::new(|_| {})).await;
        assert!(!subscription.is_active());
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let remote = Arc::new(MemoryRemote::new());
        remote.set_unreachable(true);
        let mirror = RemoteMirror::new(remote.clone());

        assert!(mirror.is_configured());
        assert_eq!(mirror.fetch_remote("abc123").await, None);

        let doc = ScheduleDocument::from_days([empty_day(today())]);
        mirror.upsert_remote("abc123", &doc).await;
        assert_eq!(remote.row("abc123"), None);

        let subscription = mirror.subscribe("abc123", Box::new(|_| {})).await;
        assert!(!subscription.is_active());
    }

    #[test]
    fn test_from_config_without_config_is_disabled() {
        assert!(!RemoteMirror::from_config(None, Duration::from_secs(5)).is_configured());
    }

    #[test]
    fn test_from_config_with_bad_url_is_disabled() {
        let config = RemoteConfig::new("nope", "k");
        assert!(!RemoteMirror::from_config(Some(&config), Duration::from_secs(5)).is_configured());
    }
}
