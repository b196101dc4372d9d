//! Terminal rendering for calendar types.
//!
//! Adds colored output to schoolcal-core types using owo_colors.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use owo_colors::OwoColorize;
use schoolcal_core::{CalendarEvent, CalendarSnapshot, LoadStatus, YearMonth};

/// Extension trait for terminal rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for CalendarEvent {
    fn render(&self) -> String {
        let mut lines = vec![
            format!("   {}", long_date(self.date()).green()),
            format!("   {}", self.title().bold()),
        ];
        if let Some(subtitle) = self.subtitle().filter(|s| !s.is_empty()) {
            lines.push(format!("     {}", subtitle.dimmed()));
        }
        if let Some(body) = self.body().filter(|s| !s.is_empty()) {
            lines.push(format!("     {}", body));
        }
        if let Some(footer) = self.footer().filter(|s| !s.is_empty()) {
            lines.push(format!("     {}", footer.italic().dimmed()));
        }
        if let Some(url) = self.image_url().filter(|s| !s.is_empty()) {
            lines.push(format!("     {}", format!("Image: {url}").dimmed()));
        }
        lines.join("\n")
    }
}

/// "July 22, 2024"
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// "1 event" / "3 events"
pub fn event_count(count: usize) -> String {
    if count == 1 {
        "1 event".to_string()
    } else {
        format!("{count} events")
    }
}

const WEEKDAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];
/// Day number plus a `+N` marker
const CELL_WIDTH: usize = 5;

/// Month grid, Sunday first. Days with events carry a `+N` marker.
pub fn render_month_grid(
    month: YearMonth,
    counts: &BTreeMap<NaiveDate, usize>,
    today: Option<NaiveDate>,
) -> String {
    let grid_width = WEEKDAYS.len() * (CELL_WIDTH + 1) - 1;
    let mut lines = Vec::new();

    let title = month.to_string();
    lines.push(format!("{:^grid_width$}", title).bold().to_string());
    lines.push(
        WEEKDAYS
            .iter()
            .map(|d| format!("{d:<CELL_WIDTH$}"))
            .collect::<Vec<_>>()
            .join(" ")
            .dimmed()
            .to_string(),
    );

    let offset = month.first_day().weekday().num_days_from_sunday() as usize;
    let mut cells: Vec<String> = vec![" ".repeat(CELL_WIDTH); offset];

    for day in 1..=month.days_in_month() {
        let Ok(date) = month.day(day) else { continue };
        let count = counts.get(&date).copied().unwrap_or(0);
        let marker = if count > 0 {
            format!("+{count}")
        } else {
            String::new()
        };
        let plain = format!("{day:>2}{marker:<3}");

        let cell = if Some(date) == today {
            plain.reversed().to_string()
        } else if count > 0 {
            plain.green().bold().to_string()
        } else {
            plain
        };
        cells.push(cell);
    }

    for week in cells.chunks(WEEKDAYS.len()) {
        lines.push(week.join(" ").trim_end().to_string());
    }

    lines.join("\n")
}

/// Side list for the displayed month, plus any load problems.
pub fn render_event_list(snapshot: &CalendarSnapshot) -> String {
    let heading = match snapshot.month {
        Some(month) => format!("Events for {month}"),
        None => "Events".to_string(),
    };
    let mut lines = vec![heading.bold().to_string()];

    match snapshot.status {
        LoadStatus::Errored => {
            let error = snapshot.error.as_deref().unwrap_or("unknown error");
            lines.push(format!("   {}", format!("Could not load events: {error}").red()));
            return lines.join("\n");
        }
        LoadStatus::Loading | LoadStatus::Idle => {
            lines.push(format!("   {}", "Loading events...".dimmed()));
            return lines.join("\n");
        }
        LoadStatus::Ready => {}
    }

    if snapshot.events.is_empty() {
        lines.push(format!("   {}", "No events scheduled for this month".dimmed()));
    } else {
        for event in &snapshot.events {
            lines.push(event.render());
            lines.push(String::new());
        }
        lines.pop();
    }

    if snapshot.skipped > 0 {
        let note = format!(
            "({} malformed {} skipped)",
            snapshot.skipped,
            if snapshot.skipped == 1 { "record" } else { "records" }
        );
        lines.push(format!("   {}", note.yellow()));
    }

    lines.join("\n")
}
