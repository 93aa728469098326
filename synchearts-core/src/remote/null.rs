//! Remote capability used when no backend is configured.

use async_trait::async_trait;

use crate::error::SyncResult;
use crate::remote::{ChangeCallback, RemoteStore, Subscription};
use crate::schedule::ScheduleDocument;

/// Never finds anything, accepts every write, never notifies.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRemote;

#[async_trait]
impl RemoteStore for NoRemote {
    fn is_configured(&self) -> bool {
        false
    }

    async fn fetch(&self, _couple_key: &str) -> SyncResult<Option<ScheduleDocument>> {
        Ok(None)
    }

    async fn upsert(&self, _couple_key: &str, _doc: &ScheduleDocument) -> SyncResult<()> {
        Ok(())
    }

    async fn subscribe(
        &self,
        _couple_key: &str,
        _on_change: ChangeCallback,
    ) -> SyncResult<Subscription> {
        Ok(Subscription::inert())
    }
}
