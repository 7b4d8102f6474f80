//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! EMAs recurse from bar 0 with the first input as seed. The line is valid
//! once the slow EMA has seen a full window (slow-1 bars); the signal and
//! histogram need a further signal-1 bars of MACD values.
//!
//! Default parameters: fast=12, slow=26, signal=9.

use crate::domain::error::FlintsteelError;
use crate::domain::indicator::ema::ema_raw;
use crate::domain::indicator::{
    validate_period, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[Bar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Result<IndicatorSeries, FlintsteelError> {
    validate_period("macd fast", fast)?;
    validate_period("macd slow", slow)?;
    validate_period("macd signal", signal_period)?;
    if fast >= slow {
        return Err(FlintsteelError::invalid_parameter(
            "macd fast",
            format!("fast period ({fast}) must be less than slow period ({slow})"),
        ));
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema_fast = ema_raw(closes.iter().copied(), fast);
    let ema_slow = ema_raw(closes.iter().copied(), slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_raw(macd_line.iter().copied(), signal_period);

    // The comparison needs both lines, so a point is valid only once the
    // signal has stabilized too.
    let signal_warmup = slow - 1 + signal_period - 1;

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let line = macd_line[i];
            let signal = signal_line[i];
            IndicatorPoint {
                date: bar.date,
                valid: i >= signal_warmup,
                value: IndicatorValue::Macd {
                    line,
                    signal,
                    histogram: line - signal,
                },
            }
        })
        .collect();

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Macd {
            fast,
            slow,
            signal: signal_period,
        },
        values,
    })
}

pub fn calculate_macd_default(bars: &[Bar]) -> Result<IndicatorSeries, FlintsteelError> {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
