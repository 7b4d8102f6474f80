//! Bollinger Bands indicator.
//!
//! - Middle: SMA over n periods
//! - Upper: middle + devfactor × stddev
//! - Lower: middle - devfactor × stddev
//!
//! StdDev is population standard deviation (divides by N, not N-1).
//! Warmup: first (n-1) bars are invalid.

use crate::domain::error::FlintsteelError;
use crate::domain::indicator::{
    validate_period, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::Bar;

pub fn calculate_bollinger(
    bars: &[Bar],
    period: usize,
    devfactor: f64,
) -> Result<IndicatorSeries, FlintsteelError> {
    validate_period("bollinger period", period)?;
    if devfactor <= 0.0 {
        return Err(FlintsteelError::invalid_parameter(
            "bollinger devfactor",
            "devfactor must be positive",
        ));
    }

    let mut values = Vec::with_capacity(bars.len());
    let warmup = period - 1;

    for i in 0..bars.len() {
        let date = bars[i].date;
        let valid = i >= warmup;

        let (upper, middle, lower) = if valid {
            let window = &bars[i + 1 - period..=i];

            let middle: f64 = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
            let variance: f64 = window
                .iter()
                .map(|b| {
                    let diff = b.close - middle;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;
            let stddev = variance.sqrt();

            (middle + devfactor * stddev, middle, middle - devfactor * stddev)
        } else {
            (0.0, 0.0, 0.0)
        };

        values.push(IndicatorPoint {
            date,
            valid,
            value: IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            },
        });
    }

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Bollinger { period, devfactor },
        values,
    })
}
