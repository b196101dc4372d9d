//! Month-scoped event aggregation.
//!
//! The aggregator holds the events of exactly one month: the one last passed
//! to [`Aggregator::set_current_month`]. Every month change issues a new
//! [`FetchTicket`]; results are committed only if they carry the latest
//! ticket, so a slow response for a month the user already left is dropped.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{SourceError, SourceResult};
use crate::event::{CalendarEvent, RawEventRecord};
use crate::expand::{DateZone, expand_batch};
use crate::month::YearMonth;
use crate::source::EventSource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    /// No month selected yet
    #[default]
    Idle,
    Loading,
    Ready,
    Errored,
}

/// Identifies one fetch; issued by `set_current_month`, redeemed by `commit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    token: u64,
    month: YearMonth,
}

impl FetchTicket {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The result was for the latest request and is now visible.
    Applied,
    /// A newer request superseded this one; the result was discarded.
    Stale,
}

#[derive(Debug, Default)]
pub struct Aggregator {
    current_month: Option<YearMonth>,
    status: LoadStatus,
    events: Vec<CalendarEvent>,
    /// date -> positions in `events`, in source order
    by_day: BTreeMap<NaiveDate, Vec<usize>>,
    last_error: Option<SourceError>,
    skipped: usize,
    latest_token: u64,
    pending: Option<u64>,
    zone: DateZone,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An aggregator reading event timestamps in `zone`.
    pub fn with_zone(zone: DateZone) -> Self {
        Aggregator {
            zone,
            ..Self::default()
        }
    }

    pub fn zone(&self) -> DateZone {
        self.zone
    }

    /// Applies from the next committed fetch on.
    pub fn set_zone(&mut self, zone: DateZone) {
        self.zone = zone;
    }

    /// Switch to `month`. The previous month's events are dropped at once
    /// and the returned ticket must be used to commit the new fetch.
    pub fn set_current_month(&mut self, month: YearMonth) -> FetchTicket {
        self.latest_token += 1;
        let ticket = FetchTicket {
            token: self.latest_token,
            month,
        };

        tracing::debug!(%month, token = ticket.token, "month changed");

        self.current_month = Some(month);
        self.status = LoadStatus::Loading;
        self.events.clear();
        self.by_day.clear();
        self.last_error = None;
        self.skipped = 0;
        self.pending = Some(ticket.token);

        ticket
    }

    /// Re-request the current month, e.g. after an error.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        let month = self.current_month?;
        Some(self.set_current_month(month))
    }

    /// Apply the result of the fetch identified by `ticket`.
    pub fn commit(
        &mut self,
        ticket: FetchTicket,
        result: SourceResult<Vec<RawEventRecord>>,
    ) -> CommitOutcome {
        if self.pending != Some(ticket.token) {
            tracing::debug!(
                month = %ticket.month,
                token = ticket.token,
                latest = self.latest_token,
                "discarding stale fetch result"
            );
            return CommitOutcome::Stale;
        }
        self.pending = None;

        match result {
            Ok(records) => {
                let expansion = expand_batch(&records, ticket.month, self.zone);
                self.skipped = expansion.skipped;
                self.events = expansion.events;
                self.rebuild_index();
                self.status = LoadStatus::Ready;

                tracing::info!(
                    month = %ticket.month,
                    records = records.len(),
                    events = self.events.len(),
                    skipped = self.skipped,
                    "events loaded"
                );
            }
            Err(e) => {
                tracing::warn!(month = %ticket.month, error = %e, "failed to load events");
                self.last_error = Some(e);
                self.status = LoadStatus::Errored;
            }
        }

        CommitOutcome::Applied
    }

    /// Select `month`, fetch it from `source` and commit the result.
    pub async fn load<S: EventSource>(&mut self, source: &S, month: YearMonth) -> CommitOutcome {
        let ticket = self.set_current_month(month);
        let result = source.fetch_events_for_month(month).await;
        self.commit(ticket, result)
    }

    fn rebuild_index(&mut self) {
        self.by_day.clear();
        for (i, event) in self.events.iter().enumerate() {
            self.by_day.entry(event.date()).or_default().push(i);
        }
    }

    fn committed(&self) -> bool {
        self.status == LoadStatus::Ready
    }

    pub fn current_month(&self) -> Option<YearMonth> {
        self.current_month
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn last_error(&self) -> Option<&SourceError> {
        self.last_error.as_ref()
    }

    /// Records dropped from the last committed batch.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// All loaded events dated exactly `date`, in source order.
    pub fn events_for_day(&self, date: NaiveDate) -> Vec<&CalendarEvent> {
        if !self.committed() {
            return Vec::new();
        }
        self.by_day
            .get(&date)
            .map(|ids| ids.iter().map(|&i| &self.events[i]).collect())
            .unwrap_or_default()
    }

    /// Number of events on `date`, for grid cells.
    pub fn day_annotation(&self, date: NaiveDate) -> usize {
        if !self.committed() {
            return 0;
        }
        self.by_day.get(&date).map_or(0, Vec::len)
    }

    /// Events inside the current month, ascending by date. Events sharing a
    /// date keep their source order. Anything the source returned outside
    /// the month is left out.
    pub fn events_for_current_month(&self) -> Vec<&CalendarEvent> {
        let Some(month) = self.current_month.filter(|_| self.committed()) else {
            return Vec::new();
        };
        self.by_day
            .range(month.first_day()..month.end_day())
            .flat_map(|(_, ids)| ids.iter().map(|&i| &self.events[i]))
            .collect()
    }

    /// Per-day event counts inside the current month; days without events
    /// are absent.
    pub fn month_day_counts(&self) -> BTreeMap<NaiveDate, usize> {
        let Some(month) = self.current_month.filter(|_| self.committed()) else {
            return BTreeMap::new();
        };
        self.by_day
            .range(month.first_day()..month.end_day())
            .map(|(date, ids)| (*date, ids.len()))
            .collect()
    }
}
