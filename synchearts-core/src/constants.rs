//! Product constants shared across the workspace.

/// Number of upcoming days kept populated in a schedule document.
pub const DEFAULT_WINDOW_DAYS: usize = 18;

/// Window size of the first release, still used by some tests and setups.
pub const LEGACY_WINDOW_DAYS: usize = 7;

/// Mood assigned to a freshly created day.
pub const DEFAULT_MOOD: u8 = 50;

pub const MAX_MOOD: u8 = 100;

/// A FREE bucket counts as surprise-friendly once mood is strictly above this.
pub const SURPRISE_MOOD_THRESHOLD: u8 = 70;

/// Default interval for polling-based remote change feeds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
