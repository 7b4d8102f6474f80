//! Simple Moving Average indicator.
//!
//! Arithmetic mean of the last n closes. Warmup: first (n-1) bars are invalid.

use crate::domain::error::FlintsteelError;
use crate::domain::indicator::{
    validate_period, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::Bar;

pub fn calculate_sma(bars: &[Bar], period: usize) -> Result<IndicatorSeries, FlintsteelError> {
    validate_period("sma period", period)?;

    let mut values = Vec::with_capacity(bars.len());
    let warmup = period - 1;
    let mut window_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        window_sum += bar.close;
        if i >= period {
            window_sum -= bars[i - period].close;
        }

        let valid = i >= warmup;
        let value = if valid { window_sum / period as f64 } else { 0.0 };

        values.push(IndicatorPoint {
            date: bar.date,
            valid,
            value: IndicatorValue::Simple(value),
        });
    }

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    })
}
