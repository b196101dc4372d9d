//! The event source seam.
//!
//! The aggregator only ever talks to an [`EventSource`]. The production
//! implementation is [`HttpEventSource`], which queries the school API's
//! `/events/current-month` endpoint.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::CalendarConfig;
use crate::error::{SourceError, SourceResult};
use crate::event::RawEventRecord;
use crate::month::YearMonth;

/// Anything that can deliver the raw records for one month.
pub trait EventSource: Send + Sync + 'static {
    fn fetch_events_for_month(
        &self,
        month: YearMonth,
    ) -> impl Future<Output = SourceResult<Vec<RawEventRecord>>> + Send;
}

/// How the remote API numbers months in its `month` query parameter.
///
/// Months are zero-based everywhere inside the crate; this is the only
/// place the index is converted for the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthParam {
    /// January = 1
    #[default]
    OneBased,
    /// January = 0
    ZeroBased,
}

impl MonthParam {
    pub fn query_value(&self, month: YearMonth) -> u32 {
        match self {
            MonthParam::OneBased => month.index0() + 1,
            MonthParam::ZeroBased => month.index0(),
        }
    }
}

const EVENTS_PATH: &str = "/events/current-month";

/// Longest error body quoted back in a `SourceError::Status`.
const MAX_ERROR_BODY: usize = 200;

/// HTTP client for the school API.
pub struct HttpEventSource {
    http: reqwest::Client,
    base_url: String,
    month_param: MonthParam,
    send_year: bool,
}

impl HttpEventSource {
    pub fn new(config: &CalendarConfig) -> SourceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        Ok(HttpEventSource {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            month_param: config.month_param,
            send_year: config.send_year,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, EVENTS_PATH)
    }

    /// Query parameters for `month`. The month parameter is always sent,
    /// January included.
    pub fn query(&self, month: YearMonth) -> Vec<(&'static str, String)> {
        let mut query = vec![("month", self.month_param.query_value(month).to_string())];
        if self.send_year {
            query.push(("year", month.year().to_string()));
        }
        query
    }
}

impl EventSource for HttpEventSource {
    async fn fetch_events_for_month(&self, month: YearMonth) -> SourceResult<Vec<RawEventRecord>> {
        tracing::info!(%month, url = %self.endpoint(), "fetching events");

        let resp = self
            .http
            .get(self.endpoint())
            .query(&self.query(month))
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(SourceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| SourceError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(month_param: MonthParam, send_year: bool) -> HttpEventSource {
        let config = CalendarConfig {
            api_url: "http://school.test/".to_string(),
            month_param,
            send_year,
            ..Default::default()
        };
        HttpEventSource::new(&config).unwrap()
    }

    #[test]
    fn test_month_param_conventions() {
        let january = YearMonth::new(2025, 0).unwrap();
        let december = YearMonth::new(2025, 11).unwrap();

        assert_eq!(MonthParam::OneBased.query_value(january), 1);
        assert_eq!(MonthParam::OneBased.query_value(december), 12);
        assert_eq!(MonthParam::ZeroBased.query_value(january), 0);
        assert_eq!(MonthParam::ZeroBased.query_value(december), 11);
    }

    #[test]
    fn test_query_always_includes_month() {
        let january = YearMonth::new(2025, 0).unwrap();

        let zero_based = source(MonthParam::ZeroBased, false);
        assert_eq!(zero_based.query(january), vec![("month", "0".to_string())]);

        let with_year = source(MonthParam::OneBased, true);
        assert_eq!(
            with_year.query(january),
            vec![("month", "1".to_string()), ("year", "2025".to_string())]
        );
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let source = source(MonthParam::OneBased, false);
        assert_eq!(source.endpoint(), "http://school.test/events/current-month");
    }
}
