use anyhow::{Context, Result};
use dialoguer::Select;
use schoolcal_core::{LoadStatus, YearMonth};

use super::{load_month, open_calendar};
use crate::render::{render_event_list, render_month_grid};
use crate::utils::tui::create_spinner;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Previous,
    ThisMonth,
    Retry,
    Quit,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Action::Next => "Next month",
            Action::Previous => "Previous month",
            Action::ThisMonth => "This month",
            Action::Retry => "Retry",
            Action::Quit => "Quit",
        }
    }
}

pub async fn run(api_url: Option<String>, start: YearMonth) -> Result<()> {
    let calendar = open_calendar(api_url)?;
    let today = chrono::Local::now().date_naive();

    let mut snapshot = load_month(&calendar, start).await?;

    loop {
        let month = snapshot.month.unwrap_or(start);
        println!("{}", render_month_grid(month, &snapshot.day_counts, Some(today)));
        println!();
        println!("{}", render_event_list(&snapshot));
        println!();

        let mut actions = vec![Action::Next, Action::Previous, Action::ThisMonth];
        if snapshot.status == LoadStatus::Errored {
            actions.insert(0, Action::Retry);
        }
        actions.push(Action::Quit);

        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let selection = Select::new()
            .with_prompt("Navigate")
            .items(&labels)
            .default(0)
            .interact()?;

        snapshot = match actions[selection] {
            Action::Next => match month.next() {
                Some(next) => load_month(&calendar, next).await?,
                None => continue,
            },
            Action::Previous => match month.prev() {
                Some(prev) => load_month(&calendar, prev).await?,
                None => continue,
            },
            Action::ThisMonth => load_month(&calendar, YearMonth::from_date(today)?).await?,
            Action::Retry => {
                let spinner = create_spinner(format!("Retrying {month}"));
                let task = calendar.retry();
                if let Some(task) = task {
                    task.await.context("Fetch task failed")?;
                }
                spinner.finish_and_clear();
                calendar.snapshot()
            }
            Action::Quit => break,
        };
    }

    Ok(())
}
