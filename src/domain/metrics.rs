//! Performance metrics over a completed run.
//!
//! Sharpe is computed from the underlying instrument's close-to-close
//! returns, not from the equity curve, so a strategy that sits in cash still
//! reports the market's risk profile alongside its own return. The ratio is
//! NaN when the return series is degenerate (fewer than two closes, or zero
//! variance); that is a reportable outcome, not an error.

use crate::domain::error::FlintsteelError;

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// (final - initial) / initial over the equity curve.
    pub total_return: f64,
    /// Mean excess return over population stddev of excess returns.
    pub sharpe_ratio: f64,
    /// Worst peak-to-trough drop of the equity curve, as a non-positive
    /// fraction.
    pub max_drawdown: f64,
}

pub fn compute_metrics(
    equity: &[f64],
    closes: &[f64],
    risk_free_rate: f64,
) -> Result<Metrics, FlintsteelError> {
    if equity.is_empty() {
        return Err(FlintsteelError::EmptySeries);
    }

    Ok(Metrics {
        total_return: total_return(equity),
        sharpe_ratio: sharpe_ratio(closes, risk_free_rate),
        max_drawdown: max_drawdown(equity),
    })
}

fn total_return(equity: &[f64]) -> f64 {
    let initial = equity[0];
    let last = equity[equity.len() - 1];
    (last - initial) / initial
}

fn sharpe_ratio(closes: &[f64], risk_free_rate: f64) -> f64 {
    let returns: Vec<f64> = closes.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();
    sharpe_from_returns(&returns, risk_free_rate)
}

// Shifting every return and the rate by the same constant leaves the
// excess series, and therefore the ratio, unchanged.
fn sharpe_from_returns(returns: &[f64], risk_free_rate: f64) -> f64 {
    let excess: Vec<f64> = returns.iter().map(|r| r - risk_free_rate).collect();
    if excess.is_empty() {
        return f64::NAN;
    }

    let n = excess.len() as f64;
    let mean = excess.iter().sum::<f64>() / n;
    let variance = excess.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev == 0.0 {
        return f64::NAN;
    }
    mean / stddev
}

fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst: f64 = 0.0;

    for &value in equity {
        if value > peak {
            peak = value;
        }
        let drawdown = value / peak - 1.0;
        if drawdown < worst {
            worst = drawdown;
        }
    }

    worst
}
