//! Filesystem-backed key-value store: one file per key.

use std::path::PathBuf;

use sha2::{Digest, Sha256};
use url::form_urlencoded;

use crate::error::SyncResult;
use crate::local::KeyValueStore;

/// Longest file stem written as a readable encoded key.
const MAX_ENCODED_KEY_LEN: usize = 200;

/// Prefix of digest-named files. `form_urlencoded` only ever emits `%`
/// followed by two uppercase hex digits, so no encoded key starts with it.
const DIGEST_PREFIX: &str = "%sha256-";

/// Stores each key as a file in `dir`.
///
/// Keys are arbitrary strings (couple keys included), so they are
/// percent-encoded into file names. Keys too long for a file name are stored
/// under their SHA-256 digest.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> SyncResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> SyncResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let mut temp = path.clone().into_os_string();
        temp.push(".tmp");

        std::fs::write(&temp, value)?;
        std::fs::rename(&temp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> SyncResult<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn encode_key(key: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(key.as_bytes()).collect();
    if encoded.len() <= MAX_ENCODED_KEY_LEN {
        return encoded;
    }

    let digest = Sha256::digest(key.as_bytes());
    format!("{}{:x}", DIGEST_PREFIX, digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_key_keeps_safe_chars() {
        assert_eq!(encode_key("synchearts_data_v1_abc-123"), "synchearts_data_v1_abc-123");
    }

    #[test]
    fn test_encode_key_escapes_separators() {
        assert_eq!(encode_key("a/b"), "a%2Fb");
        assert_eq!(encode_key("a_b"), "a_b");
        assert_eq!(encode_key("../x"), "..%2Fx");
        assert_eq!(encode_key("a b+c"), "a+b%2Bc");
        assert_eq!(encode_key("ü"), "%C3%BC");
    }

    #[test]
    fn test_long_keys_use_digest() {
        let long = "x".repeat(300);
        let name = encode_key(&long);
        assert!(name.starts_with(DIGEST_PREFIX));
        assert_eq!(name.len(), DIGEST_PREFIX.len() + 64);
        assert_eq!(name, encode_key(&long));
        assert_ne!(name, encode_key(&"x".repeat(301)));

        // Non-ASCII triples in length once encoded
        let hearts = "💕".repeat(20);
        assert!(encode_key(&hearts).starts_with(DIGEST_PREFIX));
    }

    #[test]
    fn test_long_and_non_ascii_keys_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let long = format!("synchearts_data_v1_{}", "our favourite song lyrics ".repeat(12));
        let hearts = format!("synchearts_data_v1_{}", "ich liebe dich 💕 ".repeat(10));
        let short = "synchearts_data_v1_schatz ♥";

        let entries = [(long.as_str(), "long"), (hearts.as_str(), "ütf"), (short, "tiny")];
        for (key, value) in entries {
            store.set(key, value.as_bytes()).unwrap();
        }
        for (key, value) in entries {
            assert_eq!(store.get(key).unwrap(), Some(value.as_bytes().to_vec()));
        }

        store.remove(&long).unwrap();
        assert_eq!(store.get(&long).unwrap(), None);
    }

    #[test]
    fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", b"one").unwrap();
        store.set("k", b"two").unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"two".to_vec()));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        // Removing twice is fine
        store.remove("k").unwrap();
    }

    #[test]
    fn test_distinct_keys_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.set("a/b", b"slash").unwrap();
        store.set("a_b", b"underscore").unwrap();
        assert_eq!(store.get("a/b").unwrap(), Some(b"slash".to_vec()));
        assert_eq!(store.get("a_b").unwrap(), Some(b"underscore".to_vec()));
    }
}
