//! Expansion of raw records into single-day calendar events.
//!
//! Pure and stateless: a compressed record such as `{"date": "1-31"}` becomes
//! one `CalendarEvent` per day of the range, all sharing the same title.

use std::fmt;
use std::ops::RangeInclusive;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime};

use crate::error::{CalendarError, CalendarResult};
use crate::event::{CalendarEvent, EventDetails, RawEventRecord, SourceRef};
use crate::month::YearMonth;

/// Parsed form of a day field: one day or an inclusive range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySpan {
    Single(u32),
    Range { start: u32, end: u32 },
}

impl DaySpan {
    pub fn days(&self) -> RangeInclusive<u32> {
        match *self {
            DaySpan::Single(day) => day..=day,
            DaySpan::Range { start, end } => start..=end,
        }
    }
}

/// Largest day number a day field may name. Days past the month's end still
/// roll forward, but never further than this.
pub const MAX_DAY: u32 = 31;

fn parse_day_number(field: &str, part: &str) -> CalendarResult<u32> {
    let part = part.trim();
    let day: u32 = part.parse().map_err(|_| {
        CalendarError::malformed_day(field, format!("'{part}' is not a day number"))
    })?;
    if day == 0 {
        return Err(CalendarError::malformed_day(field, "days start at 1"));
    }
    if day > MAX_DAY {
        return Err(CalendarError::malformed_day(
            field,
            format!("day {day} is past {MAX_DAY}"),
        ));
    }
    Ok(day)
}

/// Parse a day field: a bare day number (`"22"`) or an inclusive range
/// (`"1-31"`).
pub fn parse_day_field(field: &str) -> CalendarResult<DaySpan> {
    match field.split_once('-') {
        Some((start, end)) => {
            let start = parse_day_number(field, start)?;
            let end = parse_day_number(field, end)?;
            if start > end {
                return Err(CalendarError::malformed_day(
                    field,
                    format!("range start {start} is after end {end}"),
                ));
            }
            Ok(DaySpan::Range { start, end })
        }
        None => Ok(DaySpan::Single(parse_day_number(field, field)?)),
    }
}

/// Zone in which timestamps are turned back into the school day they were
/// entered for. The admin side stores a picked day as local midnight in UTC,
/// so `2024-07-21T16:00:00Z` is July 22 in UTC+8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateZone {
    /// The zone of the machine running the calendar
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl DateZone {
    pub fn date_of(&self, timestamp: &DateTime<FixedOffset>) -> NaiveDate {
        match self {
            DateZone::Local => timestamp.with_timezone(&Local).date_naive(),
            DateZone::Fixed(offset) => timestamp.with_timezone(offset).date_naive(),
        }
    }
}

impl fmt::Display for DateZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateZone::Local => write!(f, "local"),
            DateZone::Fixed(offset) => write!(f, "UTC{offset}"),
        }
    }
}

/// Parse a full date as sent by the API. Timestamps with an offset are
/// converted into `zone`; bare dates and offset-less date-times are taken
/// as written.
pub fn parse_record_date(text: &str, zone: DateZone) -> CalendarResult<NaiveDate> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(zone.date_of(&dt));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }

    Err(CalendarError::InvalidDate(text.to_string()))
}

fn span_dates(span: DaySpan, month: YearMonth) -> CalendarResult<Vec<NaiveDate>> {
    span.days().map(|day| month.day(day)).collect()
}

/// Expand one record into its calendar days.
///
/// Dated records keep their own date, read in `zone`, and ignore `month`.
/// Compressed records are placed in `month`; a list title is joined into a
/// single label that every produced day carries.
pub fn expand(
    record: &RawEventRecord,
    month: YearMonth,
    index: usize,
    zone: DateZone,
) -> CalendarResult<Vec<CalendarEvent>> {
    let source = SourceRef {
        index,
        id: record.id().map(str::to_string),
    };

    let (dates, title, details) = match record {
        RawEventRecord::Dated(r) => {
            // A dated record may still carry a bare day number.
            let dates = match parse_record_date(&r.date, zone) {
                Ok(date) => vec![date],
                Err(_) => span_dates(parse_day_field(&r.date)?, month)?,
            };
            let details = EventDetails {
                subtitle: r.subtitle.clone(),
                body: r.body.clone(),
                footer: r.footer.clone(),
                image_url: r.image.as_ref().and_then(|i| i.s3_url.clone()),
            };
            (dates, r.title.clone(), details)
        }
        RawEventRecord::Compressed(r) => {
            let dates = span_dates(parse_day_field(&r.date)?, month)?;
            let details = EventDetails {
                subtitle: r.subtitle.clone(),
                body: r.body.clone(),
                footer: r.footer.clone(),
                image_url: None,
            };
            (dates, r.event.joined(), details)
        }
    };

    Ok(dates
        .into_iter()
        .map(|date| {
            CalendarEvent::new(date, title.clone(), source.clone()).with_details(details.clone())
        })
        .collect())
}

/// Result of expanding a whole fetched batch.
#[derive(Debug, Default)]
pub struct Expansion {
    pub events: Vec<CalendarEvent>,
    /// Records dropped because their date could not be interpreted.
    pub skipped: usize,
}

/// Expand every record in order. Malformed records are dropped and logged;
/// the rest of the batch is still returned.
pub fn expand_batch(records: &[RawEventRecord], month: YearMonth, zone: DateZone) -> Expansion {
    let mut expansion = Expansion::default();

    for (index, record) in records.iter().enumerate() {
        match expand(record, month, index, zone) {
            Ok(events) => expansion.events.extend(events),
            Err(e) => {
                tracing::warn!(
                    index,
                    date = record.date_field(),
                    error = %e,
                    "skipping event record"
                );
                expansion.skipped += 1;
            }
        }
    }

    expansion
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CompressedRecord, DatedRecord, TitleField};

    fn july_2024() -> YearMonth {
        YearMonth::new(2024, 6).unwrap()
    }

    fn utc_plus(hours: i32) -> DateZone {
        DateZone::Fixed(FixedOffset::east_opt(hours * 3600).unwrap())
    }

    fn compressed(date: &str, event: TitleField) -> RawEventRecord {
        RawEventRecord::Compressed(CompressedRecord {
            id: None,
            date: date.to_string(),
            event,
            subtitle: None,
            body: None,
            footer: None,
        })
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_day_field_variants() {
        assert_eq!(parse_day_field("22").unwrap(), DaySpan::Single(22));
        assert_eq!(
            parse_day_field("1-31").unwrap(),
            DaySpan::Range { start: 1, end: 31 }
        );
        assert_eq!(
            parse_day_field(" 3 - 5 ").unwrap(),
            DaySpan::Range { start: 3, end: 5 }
        );
        assert_eq!(parse_day_field("7-7").unwrap().days().count(), 1);
    }

    #[test]
    fn test_parse_day_field_rejects_malformed() {
        for bad in ["", "abc", "0", "5-", "-5", "10-2", "1-2-3", "1.5", "32", "1-2000000"] {
            assert!(
                matches!(parse_day_field(bad), Err(CalendarError::MalformedDay { .. })),
                "Expected malformed day for {bad:?}"
            );
        }
    }

    #[test]
    fn test_list_title_collapses_into_one_event() {
        let record = compressed(
            "22",
            TitleField::Many(vec![
                "AM - Homeroom Election".to_string(),
                "PM - Club Election".to_string(),
            ]),
        );

        let events = expand(&record, july_2024(), 0, DateZone::Local).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date(), ymd(2024, 7, 22));
        assert_eq!(events[0].title(), "AM - Homeroom Election, PM - Club Election");
    }

    #[test]
    fn test_full_month_range_expands_every_day() {
        let record = compressed("1-31", TitleField::One("Nutrition Month".to_string()));

        let events = expand(&record, july_2024(), 4, DateZone::Local).unwrap();

        assert_eq!(events.len(), 31);
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.date(), ymd(2024, 7, i as u32 + 1));
            assert_eq!(event.title(), "Nutrition Month");
            assert_eq!(event.source().index, 4);
        }
    }

    #[test]
    fn test_range_cardinality_matches_span() {
        for (start, end) in [(1, 1), (3, 9), (10, 28), (15, 31)] {
            let record = compressed(
                &format!("{start}-{end}"),
                TitleField::One("Exam Week".to_string()),
            );
            let events = expand(&record, july_2024(), 0, DateZone::Local).unwrap();

            assert_eq!(events.len(), (end - start + 1) as usize);
            let days: Vec<u32> = events.iter().map(|e| chrono::Datelike::day(&e.date())).collect();
            assert_eq!(days, (start..=end).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_day_past_month_end_rolls_forward() {
        let june = YearMonth::new(2024, 5).unwrap();
        let record = compressed("30-31", TitleField::One("Recollection".to_string()));

        let events = expand(&record, june, 0, DateZone::Local).unwrap();

        assert_eq!(events[0].date(), ymd(2024, 6, 30));
        assert_eq!(events[1].date(), ymd(2024, 7, 1));
    }

    #[test]
    fn test_dated_record_keeps_its_own_date() {
        let record = RawEventRecord::Dated(DatedRecord {
            id: Some("abc".to_string()),
            title: "Foundation Day".to_string(),
            subtitle: Some("Main campus".to_string()),
            body: None,
            footer: Some("All welcome".to_string()),
            date: "2024-08-28T00:00:00.000Z".to_string(),
            image: None,
        });

        // The month argument only applies to compressed day fields.
        let events = expand(&record, july_2024(), 2, utc_plus(0)).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date(), ymd(2024, 8, 28));
        assert_eq!(events[0].subtitle(), Some("Main campus"));
        assert_eq!(events[0].footer(), Some("All welcome"));
        assert_eq!(events[0].source().id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_parse_record_date_formats() {
        let manila = utc_plus(8);
        assert_eq!(parse_record_date("2024-07-22", manila).unwrap(), ymd(2024, 7, 22));
        assert_eq!(
            parse_record_date("2024-07-22T23:30:00+08:00", manila).unwrap(),
            ymd(2024, 7, 22)
        );
        assert_eq!(
            parse_record_date("2024-07-22T08:00:00.000", manila).unwrap(),
            ymd(2024, 7, 22)
        );
        assert!(parse_record_date("July 22", manila).is_err());
    }

    #[test]
    fn test_utc_timestamp_lands_on_the_picked_local_day() {
        // Local midnight of July 22 in UTC+8, as stored by the admin form.
        let stored = "2024-07-21T16:00:00.000Z";

        assert_eq!(parse_record_date(stored, utc_plus(8)).unwrap(), ymd(2024, 7, 22));
        assert_eq!(parse_record_date(stored, utc_plus(0)).unwrap(), ymd(2024, 7, 21));
        assert_eq!(
            parse_record_date("2024-07-22T04:00:00.000Z", utc_plus(-5)).unwrap(),
            ymd(2024, 7, 21)
        );
    }

    #[test]
    fn test_range_end_is_bounded() {
        let june = YearMonth::new(2024, 5).unwrap();
        let ok = compressed("31", TitleField::One("Rollover".to_string()));
        assert_eq!(
            expand(&ok, june, 0, DateZone::Local).unwrap()[0].date(),
            ymd(2024, 7, 1)
        );

        let huge = compressed("1-2000000", TitleField::One("Forever".to_string()));
        let expansion = expand_batch(&[huge], june, DateZone::Local);
        assert_eq!(expansion.skipped, 1);
        assert!(expansion.events.is_empty());
    }

    #[test]
    fn test_expand_batch_skips_malformed_records() {
        let records = vec![
            compressed("5", TitleField::One("First".to_string())),
            compressed("soon", TitleField::One("Broken".to_string())),
            compressed("8-9", TitleField::One("Last".to_string())),
        ];

        let expansion = expand_batch(&records, july_2024(), DateZone::Local);

        assert_eq!(expansion.skipped, 1);
        let titles: Vec<&str> = expansion.events.iter().map(|e| e.title()).collect();
        assert_eq!(titles, vec!["First", "Last", "Last"]);
        assert_eq!(expansion.events[1].source().index, 2);
    }
}
