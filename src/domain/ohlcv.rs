//! OHLCV bar and price series representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// An ordered, read-only sequence of bars for one instrument, oldest first.
///
/// Built once from adapter data; nothing mutates it during a run.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    code: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Bars are sorted by date on construction; duplicate dates keep their
    /// relative order (the adapters never produce duplicates).
    pub fn new(code: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.date);
        PriceSeries {
            code: code.into(),
            bars,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
