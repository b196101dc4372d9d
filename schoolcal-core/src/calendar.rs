//! Handle used by a mounted calendar view.
//!
//! Each view owns its own `MonthCalendar`; nothing is shared between
//! instances. Month changes spawn the fetch on the tokio runtime and return
//! immediately, while the read side (`day_annotation`,
//! `current_month_event_list`) never waits on I/O.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::aggregator::{Aggregator, CommitOutcome, FetchTicket, LoadStatus};
use crate::error::CalendarResult;
use crate::event::CalendarEvent;
use crate::expand::DateZone;
use crate::month::YearMonth;
use crate::source::EventSource;

/// Everything a view needs to draw one frame.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarSnapshot {
    #[serde(serialize_with = "serialize_month")]
    pub month: Option<YearMonth>,
    pub status: LoadStatus,
    pub error: Option<String>,
    pub skipped: usize,
    pub events: Vec<CalendarEvent>,
    pub day_counts: BTreeMap<NaiveDate, usize>,
}

fn serialize_month<S: serde::Serializer>(
    month: &Option<YearMonth>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match month {
        Some(m) => serializer.serialize_str(&format!("{:04}-{:02}", m.year(), m.number())),
        None => serializer.serialize_none(),
    }
}

pub struct MonthCalendar<S> {
    state: Arc<Mutex<Aggregator>>,
    source: Arc<S>,
}

impl<S> Clone for MonthCalendar<S> {
    fn clone(&self) -> Self {
        MonthCalendar {
            state: Arc::clone(&self.state),
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: EventSource> MonthCalendar<S> {
    pub fn new(source: S) -> Self {
        Self::with_source(Arc::new(source))
    }

    pub fn with_source(source: Arc<S>) -> Self {
        MonthCalendar {
            state: Arc::new(Mutex::new(Aggregator::new())),
            source,
        }
    }

    /// Read event timestamps in `zone` instead of the local zone.
    pub fn with_zone(self, zone: DateZone) -> Self {
        self.state().set_zone(zone);
        self
    }

    fn state(&self) -> MutexGuard<'_, Aggregator> {
        // The aggregator is never left half-updated, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The visible month changed to the one containing `date`.
    pub fn on_month_change(&self, date: NaiveDate) -> CalendarResult<JoinHandle<CommitOutcome>> {
        Ok(self.navigate(YearMonth::from_date(date)?))
    }

    pub fn navigate(&self, month: YearMonth) -> JoinHandle<CommitOutcome> {
        let ticket = self.state().set_current_month(month);
        self.spawn_fetch(ticket)
    }

    /// Fetch the current month again. `None` if no month was selected yet.
    pub fn retry(&self) -> Option<JoinHandle<CommitOutcome>> {
        let ticket = self.state().refresh()?;
        Some(self.spawn_fetch(ticket))
    }

    fn spawn_fetch(&self, ticket: FetchTicket) -> JoinHandle<CommitOutcome> {
        let state = Arc::clone(&self.state);
        let source = Arc::clone(&self.source);

        tokio::spawn(async move {
            let result = source.fetch_events_for_month(ticket.month()).await;
            let mut agg = state.lock().unwrap_or_else(PoisonError::into_inner);
            agg.commit(ticket, result)
        })
    }

    pub fn current_month(&self) -> Option<YearMonth> {
        self.state().current_month()
    }

    pub fn status(&self) -> LoadStatus {
        self.state().status()
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    pub fn day_annotation(&self, date: NaiveDate) -> usize {
        self.state().day_annotation(date)
    }

    pub fn events_for_day(&self, date: NaiveDate) -> Vec<CalendarEvent> {
        self.state().events_for_day(date).into_iter().cloned().collect()
    }

    pub fn current_month_event_list(&self) -> Vec<CalendarEvent> {
        self.state()
            .events_for_current_month()
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> CalendarSnapshot {
        let agg = self.state();
        CalendarSnapshot {
            month: agg.current_month(),
            status: agg.status(),
            error: agg.last_error().map(|e| e.to_string()),
            skipped: agg.skipped(),
            events: agg
                .events_for_current_month()
                .into_iter()
                .cloned()
                .collect(),
            day_counts: agg.month_day_counts(),
        }
    }
}
