use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use schoolcal_core::{LoadStatus, YearMonth};

use super::{load_month, open_calendar};
use crate::render::{Render, event_count};

pub async fn run(api_url: Option<String>, date: NaiveDate) -> Result<()> {
    let calendar = open_calendar(api_url)?;
    let snapshot = load_month(&calendar, YearMonth::from_date(date)?).await?;

    if snapshot.status == LoadStatus::Errored {
        let error = snapshot.error.unwrap_or_default();
        anyhow::bail!("Could not load events: {}", error);
    }

    let events = calendar.events_for_day(date);
    let heading = format!(
        "{} ({})",
        date.format("%A, %B %-d, %Y"),
        event_count(calendar.day_annotation(date))
    );
    println!("{}", heading.bold());

    if events.is_empty() {
        println!("   {}", "No events scheduled for this day".dimmed());
    }
    for event in &events {
        println!("{}", event.render());
    }

    Ok(())
}
