//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seeded with the first close, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k) from bar 1 onward.
//! Points are marked valid once n bars have fed the recursion.

use crate::domain::error::FlintsteelError;
use crate::domain::indicator::{
    validate_period, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::Bar;

pub fn calculate_ema(bars: &[Bar], period: usize) -> Result<IndicatorSeries, FlintsteelError> {
    validate_period("ema period", period)?;

    let raw = ema_raw(bars.iter().map(|b| b.close), period);
    let warmup = period - 1;

    let values = bars
        .iter()
        .zip(raw)
        .enumerate()
        .map(|(i, (bar, ema))| IndicatorPoint {
            date: bar.date,
            valid: i >= warmup,
            value: IndicatorValue::Simple(ema),
        })
        .collect();

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    })
}

/// The bare recursion over any input sequence, one output per input.
/// Shared with the MACD signal line, which smooths the MACD line rather
/// than closes.
pub(crate) fn ema_raw(inputs: impl IntoIterator<Item = f64>, period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::new();
    let mut ema = 0.0;

    for (i, input) in inputs.into_iter().enumerate() {
        ema = if i == 0 {
            input
        } else {
            input * k + ema * (1.0 - k)
        };
        out.push(ema);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<Bar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn ema_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_ema(&bars, 3).unwrap();

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[4].valid);
    }

    #[test]
    fn ema_seed_is_first_close() {
        let raw = ema_raw([10.0, 20.0], 3);
        let k = 2.0 / 4.0;
        assert!((raw[0] - 10.0).abs() < f64::EPSILON);
        assert!((raw[1] - (20.0 * k + 10.0 * (1.0 - k))).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_recursive_calculation() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_ema(&bars, 2).unwrap();

        let k = 2.0 / 3.0;
        let e1 = 20.0 * k + 10.0 * (1.0 - k);
        let e2 = 30.0 * k + e1 * (1.0 - k);

        assert_eq!(series.simple_at(0), None);
        assert!((series.simple_at(1).unwrap() - e1).abs() < f64::EPSILON);
        assert!((series.simple_at(2).unwrap() - e2).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_equal_prices_stay_flat() {
        let bars = make_bars(&[100.0, 100.0, 100.0, 100.0]);
        let series = calculate_ema(&bars, 3).unwrap();

        for i in 2..4 {
            assert!((series.simple_at(i).unwrap() - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn ema_zero_period_is_invalid_parameter() {
        let bars = make_bars(&[10.0, 20.0]);
        assert!(calculate_ema(&bars, 0).is_err());
    }

    #[test]
    fn ema_empty_bars() {
        let series = calculate_ema(&[], 3).unwrap();
        assert!(series.values.is_empty());
    }
}
