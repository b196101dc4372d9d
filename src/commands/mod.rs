pub mod browse;
pub mod config;
pub mod day;
pub mod expand;
pub mod month;

use anyhow::{Context, Result};
use schoolcal_core::{CalendarConfig, CalendarSnapshot, HttpEventSource, MonthCalendar, YearMonth};

use crate::utils::tui::create_spinner;

/// Effective configuration: file, then SCHOOLCAL_API_URL, then `--api-url`.
pub fn load_config(api_url: Option<String>) -> Result<CalendarConfig> {
    let config = CalendarConfig::load()
        .context("Failed to load configuration")?
        .with_api_url(api_url)?;
    tracing::debug!(
        api_url = %config.api_url,
        month_param = ?config.month_param,
        "using configuration"
    );
    Ok(config)
}

pub fn open_calendar(api_url: Option<String>) -> Result<MonthCalendar<HttpEventSource>> {
    let config = load_config(api_url)?;
    let source = HttpEventSource::new(&config)?;
    Ok(MonthCalendar::new(source).with_zone(config.date_zone()?))
}

/// Switch `calendar` to `month` and wait for the fetch, with a spinner.
pub async fn load_month(
    calendar: &MonthCalendar<HttpEventSource>,
    month: YearMonth,
) -> Result<CalendarSnapshot> {
    let spinner = create_spinner(format!("Loading {month}"));
    let result = calendar.navigate(month).await;
    spinner.finish_and_clear();

    result.context("Fetch task failed")?;
    Ok(calendar.snapshot())
}
