//! Event types.
//!
//! `RawEventRecord` is what the school API sends back; it may describe a
//! single dated event or a compressed record spanning a range of days.
//! `CalendarEvent` is the normalized single-day unit everything else works
//! with, produced by [`crate::expand`].

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Separator used when a day carries several labels.
pub const TITLE_DELIMITER: &str = ", ";

/// A title given either as one label or as a list of labels for the same day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TitleField {
    One(String),
    Many(Vec<String>),
}

impl TitleField {
    /// Collapse into one display string.
    pub fn joined(&self) -> String {
        match self {
            TitleField::One(title) => title.clone(),
            TitleField::Many(titles) => titles.join(TITLE_DELIMITER),
        }
    }
}

/// Image attached to an event (stored in object storage by the admin side).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventImage {
    #[serde(rename = "s3key", alias = "s3Key", default)]
    pub s3_key: Option<String>,
    #[serde(rename = "s3Url", default)]
    pub s3_url: Option<String>,
}

/// An event record exactly as the remote source returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawEventRecord {
    Dated(DatedRecord),
    Compressed(CompressedRecord),
}

impl RawEventRecord {
    /// Remote identifier, when the source provides one.
    pub fn id(&self) -> Option<&str> {
        match self {
            RawEventRecord::Dated(r) => r.id.as_deref(),
            RawEventRecord::Compressed(r) => r.id.as_deref(),
        }
    }

    /// The raw `date` field, for diagnostics.
    pub fn date_field(&self) -> &str {
        match self {
            RawEventRecord::Dated(r) => &r.date,
            RawEventRecord::Compressed(r) => &r.date,
        }
    }
}

/// A single-day record carrying a full date, e.g. `"2024-07-22T00:00:00.000Z"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<EventImage>,
}

/// A record whose `date` is a day number (`"22"`) or an inclusive day range
/// (`"1-31"`) within the month being fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub date: String,
    pub event: TitleField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

/// Identity of the raw record a calendar event was expanded from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceRef {
    /// Position of the record in the fetched batch.
    pub index: usize,
    /// Remote `_id`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Supplementary text carried through unchanged from the source record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A single-day scheduling entry. Never spans more than one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    date: NaiveDate,
    title: String,
    #[serde(flatten)]
    details: EventDetails,
    source: SourceRef,
}

impl CalendarEvent {
    pub fn new(date: NaiveDate, title: impl Into<String>, source: SourceRef) -> Self {
        CalendarEvent {
            date,
            title: title.into(),
            details: EventDetails::default(),
            source,
        }
    }

    pub fn with_details(mut self, details: EventDetails) -> Self {
        self.details = details;
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.details.subtitle.as_deref()
    }

    pub fn body(&self) -> Option<&str> {
        self.details.body.as_deref()
    }

    pub fn footer(&self) -> Option<&str> {
        self.details.footer.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.details.image_url.as_deref()
    }

    pub fn source(&self) -> &SourceRef {
        &self.source
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date.format("%Y-%m-%d"), self.title)
    }
}
