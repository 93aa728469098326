//! Surprise-friendly windows, derived from status and mood.

use chrono::NaiveDate;

use crate::constants::SURPRISE_MOOD_THRESHOLD;
use crate::schedule::{AvailabilityStatus, DaySchedule, ScheduleDocument, TimeBucket};

/// A bucket on a given day that is a good time for a surprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurpriseWindow {
    pub date: NaiveDate,
    pub bucket: TimeBucket,
}

/// Explicitly marked surprise-friendly, or free on a good-mood day.
pub fn is_surprise_friendly(status: AvailabilityStatus, mood: u8) -> bool {
    match status {
        AvailabilityStatus::SurpriseFriendly => true,
        AvailabilityStatus::Free => mood > SURPRISE_MOOD_THRESHOLD,
        AvailabilityStatus::Busy | AvailabilityStatus::LowEnergy => false,
    }
}

impl DaySchedule {
    pub fn is_surprise_friendly(&self, bucket: TimeBucket) -> bool {
        is_surprise_friendly(self.buckets.get(bucket), self.mood)
    }

    /// Friendly buckets in display order.
    pub fn surprise_buckets(&self) -> Vec<TimeBucket> {
        TimeBucket::ALL
            .into_iter()
            .filter(|b| self.is_surprise_friendly(*b))
            .collect()
    }
}

impl ScheduleDocument {
    /// Friendly windows over `dates`, in date then bucket order.
    pub fn surprise_windows(&self, dates: &[NaiveDate]) -> Vec<SurpriseWindow> {
        self.days_for(dates)
            .flat_map(|day| {
                day.surprise_buckets()
                    .into_iter()
                    .map(move |bucket| SurpriseWindow {
                        date: day.date,
                        bucket,
                    })
            })
            .collect()
    }
}
