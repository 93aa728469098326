//! Schedule model: days, time buckets and availability.
//!
//! A [`ScheduleDocument`] is the whole persisted unit for one couple key. It is
//! serialized as JSON both locally and remotely, so the serde names here are
//! the wire format:
//!
//! ```json
//! {"schedules":{"2026-10-17":{"date":"2026-10-17","buckets":{"Morning":"BUSY",
//!   "Afternoon":"BUSY","Evening":"FREE","Night":"FREE"},"mood":50}}}
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{DEFAULT_MOOD, MAX_MOOD};
use crate::error::{SyncError, SyncResult};

/// One of the four fixed segments of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeBucket {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeBucket {
    /// All buckets in display order.
    pub const ALL: [TimeBucket; 4] = [
        TimeBucket::Morning,
        TimeBucket::Afternoon,
        TimeBucket::Evening,
        TimeBucket::Night,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimeBucket::Morning => "Morning",
            TimeBucket::Afternoon => "Afternoon",
            TimeBucket::Evening => "Evening",
            TimeBucket::Night => "Night",
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How open a bucket is to plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityStatus {
    Busy,
    LowEnergy,
    Free,
    SurpriseFriendly,
}

impl AvailabilityStatus {
    pub const ALL: [AvailabilityStatus; 4] = [
        AvailabilityStatus::Busy,
        AvailabilityStatus::LowEnergy,
        AvailabilityStatus::Free,
        AvailabilityStatus::SurpriseFriendly,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AvailabilityStatus::Busy => "Busy",
            AvailabilityStatus::LowEnergy => "Low Battery",
            AvailabilityStatus::Free => "Free",
            AvailabilityStatus::SurpriseFriendly => "Surprise Me",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AvailabilityStatus::Busy => "Not available",
            AvailabilityStatus::LowEnergy => "Free but tired",
            AvailabilityStatus::Free => "Open to plans",
            AvailabilityStatus::SurpriseFriendly => "Ideal for surprises",
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for AvailabilityStatus {
    type Err = String;

    /// Accepts the wire names as well as the short words used on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "busy" => Ok(AvailabilityStatus::Busy),
            "low" | "low_energy" | "low_battery" | "tired" => Ok(AvailabilityStatus::LowEnergy),
            "free" => Ok(AvailabilityStatus::Free),
            "surprise" | "surprise_friendly" | "surprise_me" => {
                Ok(AvailabilityStatus::SurpriseFriendly)
            }
            other => Err(format!(
                "Unknown status '{}'. Expected busy, low, free or surprise",
                other
            )),
        }
    }
}

/// Status for every bucket of a day.
///
/// One field per bucket, so a partial bucket set can be neither built nor
/// deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buckets {
    #[serde(rename = "Morning")]
    pub morning: AvailabilityStatus,
    #[serde(rename = "Afternoon")]
    pub afternoon: AvailabilityStatus,
    #[serde(rename = "Evening")]
    pub evening: AvailabilityStatus,
    #[serde(rename = "Night")]
    pub night: AvailabilityStatus,
}

impl Default for Buckets {
    fn default() -> Self {
        Buckets {
            morning: AvailabilityStatus::Busy,
            afternoon: AvailabilityStatus::Busy,
            evening: AvailabilityStatus::Free,
            night: AvailabilityStatus::Free,
        }
    }
}

impl Buckets {
    pub fn get(&self, bucket: TimeBucket) -> AvailabilityStatus {
        match bucket {
            TimeBucket::Morning => self.morning,
            TimeBucket::Afternoon => self.afternoon,
            TimeBucket::Evening => self.evening,
            TimeBucket::Night => self.night,
        }
    }

    pub fn set(&mut self, bucket: TimeBucket, status: AvailabilityStatus) {
        let slot = match bucket {
            TimeBucket::Morning => &mut self.morning,
            TimeBucket::Afternoon => &mut self.afternoon,
            TimeBucket::Evening => &mut self.evening,
            TimeBucket::Night => &mut self.night,
        };
        *slot = status;
    }

    /// Iterate buckets in display order.
    pub fn iter(&self) -> impl Iterator<Item = (TimeBucket, AvailabilityStatus)> + '_ {
        TimeBucket::ALL.into_iter().map(|b| (b, self.get(b)))
    }
}

/// Availability for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub buckets: Buckets,
    /// 0-100
    pub mood: u8,
}

impl DaySchedule {
    /// Copy of this day with one bucket changed.
    pub fn with_status(&self, bucket: TimeBucket, status: AvailabilityStatus) -> Self {
        let mut day = self.clone();
        day.buckets.set(bucket, status);
        day
    }

    /// Copy of this day with a new mood, clamped to 0-100.
    pub fn with_mood(&self, mood: u8) -> Self {
        DaySchedule {
            mood: mood.min(MAX_MOOD),
            ..self.clone()
        }
    }
}

/// Default schedule for a day nobody has touched yet.
pub fn empty_day(date: NaiveDate) -> DaySchedule {
    DaySchedule {
        date,
        buckets: Buckets::default(),
        mood: DEFAULT_MOOD,
    }
}

/// Everything stored for one couple key, keyed by date.
///
/// Every entry is keyed by its own `date`. Entries read with a different key
/// are moved to their date; if that date already has a correctly keyed entry
/// the stray one is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawScheduleDocument")]
pub struct ScheduleDocument {
    pub schedules: BTreeMap<NaiveDate, DaySchedule>,
}

/// Document as found on the wire, before keys are checked.
#[derive(Deserialize)]
struct RawScheduleDocument {
    #[serde(default)]
    schedules: BTreeMap<NaiveDate, DaySchedule>,
}

impl From<RawScheduleDocument> for ScheduleDocument {
    fn from(raw: RawScheduleDocument) -> Self {
        let (keyed, stray): (Vec<_>, Vec<_>) = raw
            .schedules
            .into_iter()
            .partition(|(key, day)| *key == day.date);

        let mut schedules: BTreeMap<NaiveDate, DaySchedule> = keyed.into_iter().collect();
        for (key, day) in stray {
            warn!(%key, date = %day.date, "schedule entry stored under the wrong date");
            schedules.entry(day.date).or_insert(day);
        }

        ScheduleDocument { schedules }
    }
}

impl ScheduleDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_days(days: impl IntoIterator<Item = DaySchedule>) -> Self {
        let mut doc = Self::new();
        for day in days {
            doc.insert(day);
        }
        doc
    }

    pub fn get(&self, date: &NaiveDate) -> Option<&DaySchedule> {
        self.schedules.get(date)
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.schedules.contains_key(date)
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }

    /// Insert or replace a day under its own date.
    pub fn insert(&mut self, day: DaySchedule) {
        self.schedules.insert(day.date, day);
    }

    /// New document equal to this one except at `day.date`.
    pub fn with_day(&self, day: DaySchedule) -> Self {
        let mut doc = self.clone();
        doc.insert(day);
        doc
    }

    /// Days for the given dates, in the given order, skipping missing ones.
    pub fn days_for<'a>(&'a self, dates: &'a [NaiveDate]) -> impl Iterator<Item = &'a DaySchedule> {
        dates.iter().filter_map(|d| self.get(d))
    }
}

/// Current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `window` consecutive dates starting today (local time), ascending.
pub fn upcoming_date_keys(window: usize) -> Vec<NaiveDate> {
    upcoming_date_keys_from(today(), window)
}

/// `window` consecutive dates starting at `start`, ascending.
pub fn upcoming_date_keys_from(start: NaiveDate, window: usize) -> Vec<NaiveDate> {
    start.iter_days().take(window).collect()
}

/// Resolve a day argument: `today`, `+N` (days from today) or `YYYY-MM-DD`.
pub fn resolve_date(arg: &str, today: NaiveDate) -> SyncResult<NaiveDate> {
    let arg = arg.trim();
    if arg.eq_ignore_ascii_case("today") {
        return Ok(today);
    }
    if let Some(offset) = arg.strip_prefix('+') {
        let n: u64 = offset
            .parse()
            .map_err(|_| SyncError::InvalidDate(arg.to_string()))?;
        return today
            .checked_add_days(Days::new(n))
            .ok_or_else(|| SyncError::InvalidDate(arg.to_string()));
    }
    NaiveDate::parse_from_str(arg, "%Y-%m-%d").map_err(|_| SyncError::InvalidDate(arg.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_day_defaults() {
        let day = empty_day(date(2025, 3, 20));
        assert_eq!(day.mood, 50);
        let statuses: Vec<_> = day.buckets.iter().collect();
        assert_eq!(
            statuses,
            vec![
                (TimeBucket::Morning, AvailabilityStatus::Busy),
                (TimeBucket::Afternoon, AvailabilityStatus::Busy),
                (TimeBucket::Evening, AvailabilityStatus::Free),
                (TimeBucket::Night, AvailabilityStatus::Free),
            ]
        );
    }

    #[test]
    fn test_upcoming_date_keys_are_consecutive() {
        let keys = upcoming_date_keys_from(date(2025, 12, 29), 7);
        assert_eq!(keys.len(), 7);
        assert_eq!(keys[0], date(2025, 12, 29));
        assert_eq!(keys[6], date(2026, 1, 4));
        for pair in keys.windows(2) {
            assert_eq!(pair[0].succ_opt().unwrap(), pair[1]);
        }
    }

    #[test]
    fn test_upcoming_date_keys_start_today() {
        let keys = upcoming_date_keys(18);
        assert_eq!(keys.len(), 18);
        assert_eq!(keys[0], today());
    }

    #[test]
    fn test_upcoming_date_keys_empty_window() {
        assert!(upcoming_date_keys(0).is_empty());
    }

    #[test]
    fn test_day_serialization_uses_wire_names() {
        let day = empty_day(date(2026, 10, 17)).with_status(
            TimeBucket::Night,
            AvailabilityStatus::SurpriseFriendly,
        );
        let json = serde_json::to_value(&day).unwrap();
        assert_eq!(json["date"], "2026-10-17");
        assert_eq!(json["mood"], 50);
        assert_eq!(json["buckets"]["Morning"], "BUSY");
        assert_eq!(json["buckets"]["Evening"], "FREE");
        assert_eq!(json["buckets"]["Night"], "SURPRISE_FRIENDLY");
    }

    #[test]
    fn test_document_parses_original_format() {
        let raw = r#"{"schedules":{"2026-10-17":{"date":"2026-10-17","mood":80,
            "buckets":{"Morning":"LOW_ENERGY","Afternoon":"BUSY","Evening":"FREE","Night":"FREE"}}}}"#;
        let doc: ScheduleDocument = serde_json::from_str(raw).unwrap();
        let day = doc.get(&date(2026, 10, 17)).unwrap();
        assert_eq!(day.mood, 80);
        assert_eq!(day.buckets.morning, AvailabilityStatus::LowEnergy);
    }

    #[test]
    fn test_partial_bucket_set_is_rejected() {
        let raw = r#"{"date":"2026-10-17","mood":50,"buckets":{"Morning":"BUSY"}}"#;
        assert!(serde_json::from_str::<DaySchedule>(raw).is_err());
    }

    #[test]
    fn test_with_day_only_touches_target() {
        let doc = ScheduleDocument::from_days(
            upcoming_date_keys_from(date(2025, 1, 1), 3).into_iter().map(empty_day),
        );
        let updated_day = empty_day(date(2025, 1, 2)).with_mood(90);
        let updated = doc.with_day(updated_day.clone());

        assert_ne!(updated, doc);
        assert_eq!(updated.len(), 3);
        assert_eq!(updated.get(&date(2025, 1, 2)), Some(&updated_day));
        assert_eq!(updated.get(&date(2025, 1, 1)), doc.get(&date(2025, 1, 1)));
        assert_eq!(updated.get(&date(2025, 1, 3)), doc.get(&date(2025, 1, 3)));
    }

    #[test]
    fn test_with_mood_clamps() {
        let day = empty_day(date(2025, 1, 1)).with_mood(250);
        assert_eq!(day.mood, 100);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("busy".parse::<AvailabilityStatus>(), Ok(AvailabilityStatus::Busy));
        assert_eq!("LOW_ENERGY".parse::<AvailabilityStatus>(), Ok(AvailabilityStatus::LowEnergy));
        assert_eq!("low-energy".parse::<AvailabilityStatus>(), Ok(AvailabilityStatus::LowEnergy));
        assert_eq!("surprise".parse::<AvailabilityStatus>(), Ok(AvailabilityStatus::SurpriseFriendly));
        assert!("maybe".parse::<AvailabilityStatus>().is_err());
    }

    #[test]
    fn test_resolve_date() {
        let today = date(2025, 2, 27);
        assert_eq!(resolve_date("today", today).unwrap(), today);
        assert_eq!(resolve_date("+2", today).unwrap(), date(2025, 3, 1));
        assert_eq!(resolve_date("2025-03-20", today).unwrap(), date(2025, 3, 20));
        assert!(matches!(
            resolve_date("next week", today),
            Err(SyncError::InvalidDate(_))
        ));
    }

    fn day_json(date: &str, mood: u8) -> String {
        format!(
            r#"{{"date":"{date}","buckets":{{"Morning":"BUSY","Afternoon":"BUSY","Evening":"FREE","Night":"FREE"}},"mood":{mood}}}"#
        )
    }

    #[test]
    fn test_entry_under_wrong_key_moves_to_its_date() {
        let json = format!(
            r#"{{"schedules":{{"2024-01-15":{}}}}}"#,
            day_json("2024-01-16", 80)
        );
        let doc: ScheduleDocument = serde_json::from_str(&json).unwrap();

        assert_eq!(doc.len(), 1);
        assert!(!doc.contains(&date(2024, 1, 15)));
        assert_eq!(doc.get(&date(2024, 1, 16)).unwrap().mood, 80);

        // Editing that day replaces the entry instead of adding a second one
        let edited = doc.with_day(empty_day(date(2024, 1, 16)).with_mood(10));
        assert_eq!(edited.len(), 1);
        assert_eq!(edited.get(&date(2024, 1, 16)).unwrap().mood, 10);
    }

    #[test]
    fn test_correctly_keyed_entry_wins_over_stray() {
        let json = format!(
            r#"{{"schedules":{{"2024-01-15":{},"2024-01-16":{}}}}}"#,
            day_json("2024-01-16", 11),
            day_json("2024-01-16", 22)
        );
        let doc: ScheduleDocument = serde_json::from_str(&json).unwrap();

        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get(&date(2024, 1, 16)).unwrap().mood, 22);
    }

    #[test]
    fn test_missing_schedules_is_empty() {
        let doc: ScheduleDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.is_empty());
    }
}
