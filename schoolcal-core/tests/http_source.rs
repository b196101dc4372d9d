//! Boundary tests for the HTTP event source against a mock school API.

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use mockito::Matcher;
use schoolcal_core::{
    Aggregator, CalendarConfig, CommitOutcome, DateZone, EventSource, HttpEventSource,
    LoadStatus, MonthCalendar, MonthParam, SourceError, YearMonth,
};

fn config(url: String, month_param: MonthParam) -> CalendarConfig {
    CalendarConfig {
        api_url: url,
        month_param,
        ..Default::default()
    }
}

const JULY_BODY: &str = r#"[
    {"date": "1-31", "event": "Nutrition Month"},
    {"date": "22", "event": ["AM - Homeroom Election", "PM - Club Election"]},
    {"_id": "665f", "title": "Sportsfest", "subtitle": "Grades 7-10", "body": "Bring water.",
     "date": "2024-07-04T16:00:00.000Z", "image": {"s3key": "k", "s3Url": "https://cdn.test/k.png"}}
]"#;

#[tokio::test]
async fn test_january_sends_month_one() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/events/current-month")
        .match_query(Matcher::UrlEncoded("month".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let source = HttpEventSource::new(&config(server.url(), MonthParam::OneBased)).unwrap();
    let records = source
        .fetch_events_for_month(YearMonth::new(2025, 0).unwrap())
        .await
        .expect("Should fetch");

    assert!(records.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_zero_based_convention_and_year() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/events/current-month")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("month".into(), "9".into()),
            Matcher::UrlEncoded("year".into(), "2024".into()),
        ]))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let mut cfg = config(server.url(), MonthParam::ZeroBased);
    cfg.send_year = true;
    let source = HttpEventSource::new(&cfg).unwrap();
    source
        .fetch_events_for_month(YearMonth::new(2024, 9).unwrap())
        .await
        .expect("Should fetch");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status_is_source_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/events/current-month")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("database offline")
        .create_async()
        .await;

    let source = HttpEventSource::new(&config(server.url(), MonthParam::OneBased)).unwrap();
    let err = source
        .fetch_events_for_month(YearMonth::new(2024, 6).unwrap())
        .await
        .expect_err("Should fail");

    assert_eq!(
        err,
        SourceError::Status {
            status: 500,
            message: "database offline".to_string()
        }
    );
}

#[tokio::test]
async fn test_undecodable_body_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/events/current-month")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"events": "not a list"}"#)
        .create_async()
        .await;

    let source = HttpEventSource::new(&config(server.url(), MonthParam::OneBased)).unwrap();
    let err = source
        .fetch_events_for_month(YearMonth::new(2024, 6).unwrap())
        .await
        .expect_err("Should fail");

    assert!(matches!(err, SourceError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Nothing listens on port 9 (discard) in the test environment.
    let source =
        HttpEventSource::new(&config("http://127.0.0.1:9".to_string(), MonthParam::OneBased))
            .unwrap();

    let mut agg = Aggregator::new();
    let outcome = agg.load(&source, YearMonth::new(2024, 6).unwrap()).await;

    assert_eq!(outcome, CommitOutcome::Applied);
    assert_eq!(agg.status(), LoadStatus::Errored);
    assert!(matches!(agg.last_error(), Some(SourceError::Transport(_))));
}

#[tokio::test]
async fn test_july_feed_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/events/current-month")
        .match_query(Matcher::UrlEncoded("month".into(), "7".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(JULY_BODY)
        .create_async()
        .await;

    let source = HttpEventSource::new(&config(server.url(), MonthParam::OneBased)).unwrap();
    // The admin form stores July 5 as local midnight in UTC+8.
    let manila = DateZone::Fixed(FixedOffset::east_opt(8 * 3600).unwrap());
    let calendar = MonthCalendar::with_source(Arc::new(source)).with_zone(manila);

    let outcome = calendar
        .on_month_change(NaiveDate::from_ymd_opt(2024, 7, 10).unwrap())
        .unwrap()
        .await
        .unwrap();
    assert_eq!(outcome, CommitOutcome::Applied);

    let list = calendar.current_month_event_list();
    // 31 days of Nutrition Month + the election day + Sportsfest
    assert_eq!(list.len(), 33);
    assert!(list.windows(2).all(|w| w[0].date() <= w[1].date()));

    let day = NaiveDate::from_ymd_opt(2024, 7, 22).unwrap();
    assert_eq!(calendar.day_annotation(day), 2);
    let titles: Vec<String> = calendar
        .events_for_day(day)
        .iter()
        .map(|e| e.title().to_string())
        .collect();
    assert_eq!(
        titles,
        vec!["Nutrition Month", "AM - Homeroom Election, PM - Club Election"]
    );

    let sportsfest = calendar
        .events_for_day(NaiveDate::from_ymd_opt(2024, 7, 5).unwrap())
        .into_iter()
        .find(|e| e.title() == "Sportsfest")
        .expect("Should have Sportsfest");
    assert_eq!(sportsfest.subtitle(), Some("Grades 7-10"));
    assert_eq!(sportsfest.image_url(), Some("https://cdn.test/k.png"));
    assert_eq!(sportsfest.source().id.as_deref(), Some("665f"));
}
