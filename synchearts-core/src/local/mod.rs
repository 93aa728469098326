//! Local device storage.
//!
//! The device store is an opaque key-value byte store ([`KeyValueStore`]).
//! [`LocalStore`] layers the SyncHearts records on top of it: one schedule
//! document per couple key, plus the single-slot session and remote config
//! records. Reads fail soft: anything missing or unparseable comes back as the
//! empty value and is logged.

mod file;
mod memory;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::SyncResult;
use crate::remote::RemoteConfig;
use crate::schedule::ScheduleDocument;
use crate::session::Session;

const DATA_KEY_PREFIX: &str = "synchearts_data_v1";
const SESSION_KEY: &str = "synchearts_session_v1";
const REMOTE_CONFIG_KEY: &str = "synchearts_remote_config";

/// Opaque byte store. A single `set` overwrites the whole value.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> SyncResult<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> SyncResult<()>;
    fn remove(&self, key: &str) -> SyncResult<()>;
}

/// Typed access to the records SyncHearts keeps on the device.
#[derive(Clone)]
pub struct LocalStore {
    kv: Arc<dyn KeyValueStore>,
}

impl LocalStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        LocalStore { kv }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    fn data_key(couple_key: &str) -> String {
        format!("{}_{}", DATA_KEY_PREFIX, couple_key)
    }

    // SCHEDULE DOCUMENTS:

    /// Stored document for `couple_key`, or an empty one.
    pub fn load_local(&self, couple_key: &str) -> ScheduleDocument {
        self.read_json(&Self::data_key(couple_key))
            .unwrap_or_default()
    }

    /// Overwrite the stored document for `couple_key`.
    pub fn save_local(&self, couple_key: &str, doc: &ScheduleDocument) -> SyncResult<()> {
        self.write_json(&Self::data_key(couple_key), doc)?;
        debug!(days = doc.len(), "saved schedule locally");
        Ok(())
    }

    // SESSION SLOT:

    pub fn load_session(&self) -> Option<Session> {
        self.read_json(SESSION_KEY)
    }

    pub fn save_session(&self, session: &Session) -> SyncResult<()> {
        self.write_json(SESSION_KEY, session)
    }

    pub fn clear_session(&self) -> SyncResult<()> {
        self.kv.remove(SESSION_KEY)
    }

    // REMOTE CONFIG SLOT:

    pub fn load_remote_config(&self) -> Option<RemoteConfig> {
        self.read_json(REMOTE_CONFIG_KEY)
    }

    pub fn save_remote_config(&self, config: &RemoteConfig) -> SyncResult<()> {
        self.write_json(REMOTE_CONFIG_KEY, config)
    }

    pub fn clear_remote_config(&self) -> SyncResult<()> {
        self.kv.remove(REMOTE_CONFIG_KEY)
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.kv.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "could not read local entry");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "ignoring unparseable local entry");
                None
            }
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> SyncResult<()> {
        let bytes = serde_json::to_vec(value)?;
        self.kv.set(key, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{AvailabilityStatus, TimeBucket, empty_day, upcoming_date_keys};
    use crate::session::Role;

    fn sample_document() -> ScheduleDocument {
        let mut doc =
            ScheduleDocument::from_days(upcoming_date_keys(7).into_iter().map(empty_day));
        let first = *doc.schedules.keys().next().unwrap();
        let day = doc.get(&first).unwrap().with_mood(12).with_status(
            TimeBucket::Afternoon,
            AvailabilityStatus::LowEnergy,
        );
        doc.insert(day);
        doc
    }

    #[test]
    fn test_round_trip() {
        let store = LocalStore::in_memory();
        let doc = sample_document();

        store.save_local("abc123", &doc).unwrap();
        assert_eq!(store.load_local("abc123"), doc);
    }

    #[test]
    fn test_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(Arc::new(FileStore::new(dir.path())));
        let doc = sample_document();

        store.save_local("our secret/key", &doc).unwrap();
        assert_eq!(store.load_local("our secret/key"), doc);
    }

    #[test]
    fn test_long_couple_key_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(Arc::new(FileStore::new(dir.path())));
        let doc = sample_document();
        let long_key = "our favourite song lyrics ".repeat(10);

        store.save_local(&long_key, &doc).unwrap();
        assert_eq!(store.load_local(&long_key), doc);
        assert!(store.load_local(&long_key[..long_key.len() - 1]).is_empty());
    }

    #[test]
    fn test_documents_are_namespaced_by_couple_key() {
        let store = LocalStore::in_memory();
        store.save_local("one", &sample_document()).unwrap();

        assert!(store.load_local("two").is_empty());
    }

    #[test]
    fn test_missing_document_is_empty() {
        assert!(LocalStore::in_memory().load_local("nobody").is_empty());
    }

    #[test]
    fn test_corrupt_document_is_empty() {
        let kv = Arc::new(MemoryStore::new());
        kv.set("synchearts_data_v1_abc123", b"{not json").unwrap();

        let store = LocalStore::new(kv);
        assert!(store.load_local("abc123").is_empty());
    }

    #[test]
    fn test_session_slot() {
        let store = LocalStore::in_memory();
        assert!(store.load_session().is_none());

        let session = Session::new(Role::Girlfriend, "abc123").unwrap();
        store.save_session(&session).unwrap();
        assert_eq!(store.load_session(), Some(session));

        store.clear_session().unwrap();
        assert!(store.load_session().is_none());
    }

    #[test]
    fn test_corrupt_session_is_none() {
        let kv = Arc::new(MemoryStore::new());
        kv.set("synchearts_session_v1", br#"{"role":"COUSIN"}"#).unwrap();

        assert!(LocalStore::new(kv).load_session().is_none());
    }

    #[test]
    fn test_remote_config_slot() {
        let store = LocalStore::in_memory();
        let config = RemoteConfig::new("https://example.supabase.co", "anon-key");

        store.save_remote_config(&config).unwrap();
        assert_eq!(store.load_remote_config(), Some(config));

        store.clear_remote_config().unwrap();
        assert!(store.load_remote_config().is_none());
    }
}
