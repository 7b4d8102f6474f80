//! Technical indicator implementations.
//!
//! Each indicator is a pure function of the bar slice plus parameters,
//! producing one [`IndicatorPoint`] per input bar. Points during the lookback
//! warmup carry `valid: false`; strategies treat them as "no value" and hold.
//!
//! Parameters are checked once, up front: a zero period or `fast >= slow`
//! is an `InvalidParameter` error before any bar is touched.

pub mod sma;
pub mod ema;
pub mod rsi;
pub mod bollinger;
pub mod macd;

pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

use crate::domain::error::FlintsteelError;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        devfactor: f64,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// The simple value at `index`, or `None` during warmup or for
    /// multi-line indicators.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        match self.values.get(index) {
            Some(IndicatorPoint {
                valid: true,
                value: IndicatorValue::Simple(v),
                ..
            }) => Some(*v),
            _ => None,
        }
    }

    pub fn point_at(&self, index: usize) -> Option<&IndicatorPoint> {
        self.values.get(index).filter(|p| p.valid)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger { period, devfactor } => {
                write!(f, "BOLLINGER({},{})", period, devfactor)
            }
        }
    }
}

pub(crate) fn validate_period(name: &str, period: usize) -> Result<(), FlintsteelError> {
    if period == 0 {
        return Err(FlintsteelError::invalid_parameter(
            name,
            "period must be positive",
        ));
    }
    Ok(())
}
