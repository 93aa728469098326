use anyhow::{Result, bail};
use owo_colors::OwoColorize;
use synchearts_core::schedule::{empty_day, resolve_date, today};
use synchearts_core::{AvailabilityStatus, DaySchedule, TimeBucket};

use crate::app::App;
use crate::render::DayRender;

/// Edits requested on the command line; `None` leaves a field as is.
#[derive(Debug, Default)]
pub struct DayChanges {
    pub morning: Option<AvailabilityStatus>,
    pub afternoon: Option<AvailabilityStatus>,
    pub evening: Option<AvailabilityStatus>,
    pub night: Option<AvailabilityStatus>,
    pub mood: Option<u8>,
}

impl DayChanges {
    fn statuses(&self) -> [(TimeBucket, Option<AvailabilityStatus>); 4] {
        [
            (TimeBucket::Morning, self.morning),
            (TimeBucket::Afternoon, self.afternoon),
            (TimeBucket::Evening, self.evening),
            (TimeBucket::Night, self.night),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.mood.is_none() && self.statuses().iter().all(|(_, s)| s.is_none())
    }

    pub fn apply(&self, day: &DaySchedule) -> DaySchedule {
        let mut day = day.clone();
        for (bucket, status) in self.statuses() {
            if let Some(status) = status {
                day = day.with_status(bucket, status);
            }
        }
        if let Some(mood) = self.mood {
            day = day.with_mood(mood);
        }
        day
    }
}

pub async fn run(app: &App, day_arg: &str, changes: DayChanges) -> Result<()> {
    let session = app.require_session()?;
    if !session.role.can_edit() {
        bail!("Planning mode is read-only. Only the sharing side can change days.");
    }
    if changes.is_empty() {
        bail!("Nothing to change. Pass at least one of --morning, --afternoon, --evening, --night, --mood.");
    }

    let today = today();
    let date = resolve_date(day_arg, today)?;

    let calendar = app.open_calendar(&session).await;
    let window = calendar.orchestrator().window();
    if !window.contains(&date) {
        bail!(
            "{} is outside the next {} days",
            date,
            calendar.orchestrator().window_days()
        );
    }

    let current = calendar
        .document()
        .get(&date)
        .cloned()
        .unwrap_or_else(|| empty_day(date));
    let updated = calendar.update_day(changes.apply(&current)).await;

    if let Some(day) = updated.get(&date) {
        println!("{}", day.render_card(today, false));
    }
    if !calendar.orchestrator().remote().is_configured() {
        println!();
        println!("{}", "Saved on this device only (no remote configured)".dimmed());
    }

    calendar.close();
    Ok(())
}
