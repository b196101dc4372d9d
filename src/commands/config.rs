use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use schoolcal_core::CalendarConfig;
use schoolcal_core::config::API_URL_ENV_VAR;

use super::load_config;

pub fn init(force: bool) -> Result<()> {
    let path = CalendarConfig::config_path()?;

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}\n\nUse --force to overwrite it.",
            path.display()
        );
    }

    CalendarConfig::create_default_config(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    println!("Wrote {}", path.display().green());

    Ok(())
}

pub fn show(api_url: Option<String>) -> Result<()> {
    let path = CalendarConfig::config_path()?;
    let config = load_config(api_url)?;

    println!("{}", "Paths".bold());
    let note = if path.exists() { "" } else { " (not created, using defaults)" };
    println!("  Config:        {}{}", path.display(), note.dimmed());

    println!("{}", "Settings".bold());
    println!("  API URL:       {}", config.api_url);
    if std::env::var(API_URL_ENV_VAR).is_ok() {
        println!("                 {}", format!("(${API_URL_ENV_VAR} is set)").dimmed());
    }
    println!("  Month param:   {:?}", config.month_param);
    println!("  Send year:     {}", config.send_year);
    println!("  Timeout:       {}s", config.timeout_secs);
    println!("  Time zone:     {}", config.date_zone()?);

    Ok(())
}
