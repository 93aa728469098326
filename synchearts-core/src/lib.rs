//! Core of SyncHearts, a shared availability calendar for couples.
//!
//! One partner marks how available they are for each part of the day, plus a
//! mood; the other partner reads it to plan surprises. This crate provides:
//! - the schedule model (`schedule`) and the surprise-friendly view (`surprise`)
//! - local storage (`local`) and the optional remote mirror (`remote`)
//! - `sync`, which keeps the rolling window populated and both stores in step
//! - `session` for the role / couple key pairing of this device

pub mod calendar;
pub mod config;
pub mod constants;
pub mod error;
pub mod local;
pub mod remote;
pub mod schedule;
pub mod session;
pub mod surprise;
pub mod sync;

pub use calendar::SharedCalendar;
pub use error::{SyncError, SyncResult};
pub use schedule::{AvailabilityStatus, Buckets, DaySchedule, ScheduleDocument, TimeBucket};
pub use session::{Role, Session, SessionManager};
pub use sync::{LoadSource, Loaded, SyncOrchestrator};
