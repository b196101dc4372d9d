use anyhow::Result;
use schoolcal_core::{LoadStatus, YearMonth};

use super::{load_month, open_calendar};
use crate::render::{render_event_list, render_month_grid};

pub async fn run(api_url: Option<String>, month: YearMonth, json: bool) -> Result<()> {
    let calendar = open_calendar(api_url)?;
    let snapshot = load_month(&calendar, month).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        let today = chrono::Local::now().date_naive();
        println!("{}", render_month_grid(month, &snapshot.day_counts, Some(today)));
        println!();
        println!("{}", render_event_list(&snapshot));
    }

    if snapshot.status == LoadStatus::Errored {
        anyhow::bail!("Events for {} could not be loaded", month);
    }

    Ok(())
}
