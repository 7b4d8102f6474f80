#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use flintsteel::domain::error::FlintsteelError;
pub use flintsteel::domain::ohlcv::{Bar, PriceSeries};
use flintsteel::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, FlintsteelError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(FlintsteelError::Data {
                reason: reason.clone(),
            });
        }
        let bars: Vec<Bar> = self
            .data
            .get(code)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|b| {
                !start_date.is_some_and(|s| b.date < s) && !end_date.is_some_and(|e| b.date > e)
            })
            .collect();
        if bars.is_empty() {
            return Err(FlintsteelError::NoData {
                code: code.to_string(),
            });
        }
        Ok(bars)
    }
}

pub fn make_bar(date: &str, close: f64) -> Bar {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    Bar {
        date,
        open: close,
        high: close,
        low: close,
        close,
        volume: 1000,
    }
}

/// Consecutive daily bars starting 2024-01-01, one per close.
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: start + Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000 + i as i64,
        })
        .collect()
}

pub fn make_series(code: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(code.to_string(), make_bars(closes))
}
