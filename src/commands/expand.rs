use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use schoolcal_core::{DateZone, RawEventRecord, YearMonth, expand_batch};

use crate::render::Render;

/// Expand records from a local JSON file, as the calendar would after a fetch.
pub fn run(file: &Path, month: YearMonth, zone: DateZone, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let records: Vec<RawEventRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse event records in {}", file.display()))?;

    let expansion = expand_batch(&records, month, zone);

    if json {
        println!("{}", serde_json::to_string_pretty(&expansion.events)?);
    } else {
        println!(
            "{}",
            format!(
                "{} records expanded into {} day entries for {}",
                records.len(),
                expansion.events.len(),
                month
            )
            .bold()
        );
        for event in &expansion.events {
            println!("{}", event.render());
        }
    }

    if expansion.skipped > 0 {
        eprintln!(
            "{}",
            format!("Skipped {} malformed record(s)", expansion.skipped).yellow()
        );
    }

    Ok(())
}
