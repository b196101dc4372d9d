//! Core of the school calendar.
//!
//! - `expand` turns raw API records (single dates or compressed day ranges)
//!   into single-day `CalendarEvent`s
//! - `aggregator` keeps the events of the currently displayed month and
//!   rejects fetch results for months the user already navigated away from
//! - `calendar` wraps the aggregator for a view, spawning fetches on month change
//! - `source` is the seam to the school API

pub mod aggregator;
pub mod calendar;
pub mod config;
pub mod error;
pub mod event;
pub mod expand;
pub mod month;
pub mod source;

pub use aggregator::{Aggregator, CommitOutcome, FetchTicket, LoadStatus};
pub use calendar::{CalendarSnapshot, MonthCalendar};
pub use config::CalendarConfig;
pub use error::{CalendarError, CalendarResult, SourceError, SourceResult};
pub use event::{CalendarEvent, RawEventRecord, SourceRef, TitleField};
pub use expand::{DateZone, Expansion, expand, expand_batch};
pub use month::{YearMonth, month_index};
pub use source::{EventSource, HttpEventSource, MonthParam};
