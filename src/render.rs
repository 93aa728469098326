//! Colored terminal rendering for schedule types.
//!
//! Colors are only emitted when stdout supports them.

use chrono::NaiveDate;
use owo_colors::{OwoColorize, Stream};
use synchearts_core::sync::LoadSource;
use synchearts_core::{AvailabilityStatus, DaySchedule, Role, ScheduleDocument, TimeBucket};

const MOOD_BAR_WIDTH: usize = 10;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for AvailabilityStatus {
    fn render(&self) -> String {
        let label = self.label();
        match self {
            AvailabilityStatus::Busy => label.if_supports_color(Stream::Stdout, |t| t.red()).to_string(),
            AvailabilityStatus::LowEnergy => label
                .if_supports_color(Stream::Stdout, |t| t.yellow())
                .to_string(),
            AvailabilityStatus::Free => label
                .if_supports_color(Stream::Stdout, |t| t.green())
                .to_string(),
            AvailabilityStatus::SurpriseFriendly => label
                .if_supports_color(Stream::Stdout, |t| t.magenta())
                .to_string(),
        }
    }
}

impl Render for Role {
    fn render(&self) -> String {
        let icon = match self {
            Role::Girlfriend => "💗",
            Role::Boyfriend => "🎁",
        };
        format!(
            "{} {}",
            icon,
            self.title().if_supports_color(Stream::Stdout, |t| t.bold())
        )
    }
}

impl Render for LoadSource {
    fn render(&self) -> String {
        let text = match self {
            LoadSource::RemoteHit => "synced",
            LoadSource::RemoteMissFallback => "offline copy",
            LoadSource::LocalOnly => "this device only",
        };
        dimmed(text)
    }
}

fn dimmed(text: &str) -> String {
    text.if_supports_color(Stream::Stdout, |t| t.dimmed()).to_string()
}

/// `[#######---] 70`
pub fn mood_bar(mood: u8) -> String {
    let filled = (mood as usize * MOOD_BAR_WIDTH).div_ceil(100).min(MOOD_BAR_WIDTH);
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(MOOD_BAR_WIDTH - filled)
    );

    let bar = if mood < 40 {
        bar.if_supports_color(Stream::Stdout, |t| t.red()).to_string()
    } else if mood <= 70 {
        bar.if_supports_color(Stream::Stdout, |t| t.yellow()).to_string()
    } else {
        bar.if_supports_color(Stream::Stdout, |t| t.green()).to_string()
    };

    format!("[{}] {}", bar, mood)
}

/// One line per status: label and what it means.
pub fn render_legend() -> String {
    AvailabilityStatus::ALL
        .iter()
        .map(|status| {
            let padding = " ".repeat(12usize.saturating_sub(status.label().chars().count()));
            format!("   {}{} {}", status.render(), padding, dimmed(status.description()))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub trait DayRender {
    fn render_card(&self, today: NaiveDate, surprise: bool) -> String;
}

impl DayRender for DaySchedule {
    fn render_card(&self, today: NaiveDate, surprise: bool) -> String {
        let date = self.date.format("%a, %b %-d").to_string();
        let mut title = date.if_supports_color(Stream::Stdout, |t| t.bold()).to_string();
        if self.date == today {
            title = format!(
                "{} {}",
                title,
                "Today".if_supports_color(Stream::Stdout, |t| t.cyan())
            );
        }

        let mut lines = vec![format!("{}   mood {}", title, mood_bar(self.mood))];
        for (bucket, status) in self.buckets.iter() {
            lines.push(render_bucket(self, bucket, status, surprise));
        }
        lines.join("\n")
    }
}

fn render_bucket(
    day: &DaySchedule,
    bucket: TimeBucket,
    status: AvailabilityStatus,
    surprise: bool,
) -> String {
    let name = format!("{:<10}", bucket.label());

    if !surprise {
        return format!("   {} {}", dimmed(&name), status.render());
    }

    if day.is_surprise_friendly(bucket) {
        format!(
            "   {} {} {}",
            name,
            status.render(),
            "✓".if_supports_color(Stream::Stdout, |t| t.magenta())
        )
    } else {
        format!("   {} {}", dimmed(&name), dimmed(status.label()))
    }
}

/// Day cards for `dates`, in order. Dates missing from `doc` are skipped.
pub fn render_days(
    doc: &ScheduleDocument,
    dates: &[NaiveDate],
    today: NaiveDate,
    surprise: bool,
) -> String {
    let mut cards: Vec<String> = doc
        .days_for(dates)
        .map(|day| day.render_card(today, surprise))
        .collect();

    if surprise {
        let windows = doc.surprise_windows(dates).len();
        let count = windows
            .if_supports_color(Stream::Stdout, |t| t.magenta())
            .to_string();
        let summary = match windows {
            0 => dimmed("No surprise windows coming up"),
            1 => format!("{} surprise window coming up", count),
            _ => format!("{} surprise windows coming up", count),
        };
        cards.push(summary);
    }

    cards.join("\n\n")
}
