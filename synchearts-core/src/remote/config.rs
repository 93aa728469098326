//! Remote backend configuration.

use serde::{Deserialize, Serialize};

const DEFAULT_TABLE: &str = "couple_schedules";

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

/// Where the shared document is mirrored.
///
/// There is no built-in default: without a stored config the remote
/// capability is disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub url: String,
    pub key: String,
    #[serde(default = "default_table")]
    pub table: String,
}

impl RemoteConfig {
    pub fn new(url: &str, key: &str) -> Self {
        RemoteConfig {
            url: url.trim().to_string(),
            key: key.trim().to_string(),
            table: default_table(),
        }
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.trim().to_string();
        self
    }

    /// Key with everything but the last four characters hidden. Keys of
    /// eight characters or fewer are hidden completely.
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.key.chars().collect();
        let visible = if chars.len() > 8 { 4 } else { 0 };
        let tail: String = chars[chars.len() - visible..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - visible), tail)
    }
}
