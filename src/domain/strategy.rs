//! Strategy definitions and per-bar signal evaluation.
//!
//! Strategies are a closed set of tagged variants. Each constructor validates
//! its hyperparameters, so a nonsensical period fails before the bar loop ever
//! starts. [`StrategyEngine`] precomputes the indicator series a strategy
//! needs and answers one [`Signal`] per bar; any bar whose indicators are
//! still in warmup holds.

use crate::domain::error::FlintsteelError;
use crate::domain::indicator::{
    calculate_bollinger, calculate_macd, calculate_rsi, calculate_sma, IndicatorSeries,
    IndicatorValue,
};
use crate::domain::ohlcv::Bar;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    MovingAverageCrossover {
        short_period: usize,
        long_period: usize,
    },
    RsiThreshold {
        period: usize,
        lower: f64,
        upper: f64,
    },
    BollingerBreakout {
        period: usize,
        devfactor: f64,
    },
    MacdCrossover {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    BuyAndHold,
}

impl Strategy {
    pub fn moving_average_crossover(
        short_period: usize,
        long_period: usize,
    ) -> Result<Self, FlintsteelError> {
        if short_period == 0 || long_period == 0 {
            return Err(FlintsteelError::invalid_parameter(
                "ma period",
                "periods must be positive",
            ));
        }
        if short_period >= long_period {
            return Err(FlintsteelError::invalid_parameter(
                "short_period",
                format!(
                    "short period ({short_period}) must be less than long period ({long_period})"
                ),
            ));
        }
        Ok(Strategy::MovingAverageCrossover {
            short_period,
            long_period,
        })
    }

    pub fn rsi_threshold(period: usize, lower: f64, upper: f64) -> Result<Self, FlintsteelError> {
        if period == 0 {
            return Err(FlintsteelError::invalid_parameter(
                "rsi_period",
                "period must be positive",
            ));
        }
        if !(0.0..=100.0).contains(&lower) || !(0.0..=100.0).contains(&upper) || lower >= upper {
            return Err(FlintsteelError::invalid_parameter(
                "rsi bounds",
                format!("need 0 <= lower < upper <= 100, got {lower} and {upper}"),
            ));
        }
        Ok(Strategy::RsiThreshold {
            period,
            lower,
            upper,
        })
    }

    pub fn bollinger_breakout(period: usize, devfactor: f64) -> Result<Self, FlintsteelError> {
        if period == 0 {
            return Err(FlintsteelError::invalid_parameter(
                "bbands_period",
                "period must be positive",
            ));
        }
        if devfactor <= 0.0 {
            return Err(FlintsteelError::invalid_parameter(
                "bbands_devfactor",
                "devfactor must be positive",
            ));
        }
        Ok(Strategy::BollingerBreakout { period, devfactor })
    }

    pub fn macd_crossover(
        fast: usize,
        slow: usize,
        signal: usize,
    ) -> Result<Self, FlintsteelError> {
        if fast == 0 || slow == 0 || signal == 0 {
            return Err(FlintsteelError::invalid_parameter(
                "macd period",
                "periods must be positive",
            ));
        }
        if fast >= slow {
            return Err(FlintsteelError::invalid_parameter(
                "macd_fast",
                format!("fast period ({fast}) must be less than slow period ({slow})"),
            ));
        }
        Ok(Strategy::MacdCrossover { fast, slow, signal })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::MovingAverageCrossover { .. } => "Moving Average Crossover",
            Strategy::RsiThreshold { .. } => "RSI Threshold",
            Strategy::BollingerBreakout { .. } => "Bollinger Breakout",
            Strategy::MacdCrossover { .. } => "MACD Crossover",
            Strategy::BuyAndHold => "Buy and Hold",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::MovingAverageCrossover {
                short_period,
                long_period,
            } => write!(f, "MA({short_period}/{long_period})"),
            Strategy::RsiThreshold {
                period,
                lower,
                upper,
            } => write!(f, "RSI({period},{lower},{upper})"),
            Strategy::BollingerBreakout { period, devfactor } => {
                write!(f, "BOLLINGER({period},{devfactor})")
            }
            Strategy::MacdCrossover { fast, slow, signal } => {
                write!(f, "MACD({fast},{slow},{signal})")
            }
            Strategy::BuyAndHold => write!(f, "BUY_AND_HOLD"),
        }
    }
}

/// Indicator series precomputed for one strategy over one price series.
#[derive(Debug, Clone)]
enum Snapshot {
    MovingAverage {
        short: IndicatorSeries,
        long: IndicatorSeries,
    },
    Rsi(IndicatorSeries),
    Bollinger(IndicatorSeries),
    Macd(IndicatorSeries),
    None,
}

/// Evaluates one strategy bar-by-bar against a fixed price series.
#[derive(Debug, Clone)]
pub struct StrategyEngine {
    strategy: Strategy,
    snapshot: Snapshot,
}

impl StrategyEngine {
    /// Computes the indicator series up front; per-bar evaluation is pure
    /// lookups after this.
    pub fn new(strategy: Strategy, bars: &[Bar]) -> Result<Self, FlintsteelError> {
        let snapshot = match &strategy {
            Strategy::MovingAverageCrossover {
                short_period,
                long_period,
            } => Snapshot::MovingAverage {
                short: calculate_sma(bars, *short_period)?,
                long: calculate_sma(bars, *long_period)?,
            },
            Strategy::RsiThreshold { period, .. } => Snapshot::Rsi(calculate_rsi(bars, *period)?),
            Strategy::BollingerBreakout { period, devfactor } => {
                Snapshot::Bollinger(calculate_bollinger(bars, *period, *devfactor)?)
            }
            Strategy::MacdCrossover { fast, slow, signal } => {
                Snapshot::Macd(calculate_macd(bars, *fast, *slow, *signal)?)
            }
            Strategy::BuyAndHold => Snapshot::None,
        };

        Ok(StrategyEngine { strategy, snapshot })
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// One decision per bar. `holding` is whether any units are held going
    /// into the bar. Warmup bars hold regardless of strategy.
    pub fn decide(&self, index: usize, bar: &Bar, holding: bool) -> Signal {
        match (&self.strategy, &self.snapshot) {
            (Strategy::MovingAverageCrossover { .. }, Snapshot::MovingAverage { short, long }) => {
                match (short.simple_at(index), long.simple_at(index)) {
                    (Some(s), Some(l)) if s > l && !holding => Signal::Buy,
                    (Some(s), Some(l)) if s < l && holding => Signal::Sell,
                    _ => Signal::Hold,
                }
            }
            (Strategy::RsiThreshold { lower, upper, .. }, Snapshot::Rsi(rsi)) => {
                match rsi.simple_at(index) {
                    Some(v) if v < *lower && !holding => Signal::Buy,
                    Some(v) if v > *upper && holding => Signal::Sell,
                    _ => Signal::Hold,
                }
            }
            (Strategy::BollingerBreakout { .. }, Snapshot::Bollinger(bands)) => {
                match bands.point_at(index).map(|p| &p.value) {
                    Some(IndicatorValue::Bollinger { upper, lower, .. }) => {
                        if bar.close < *lower && !holding {
                            Signal::Buy
                        } else if bar.close > *upper && holding {
                            Signal::Sell
                        } else {
                            Signal::Hold
                        }
                    }
                    _ => Signal::Hold,
                }
            }
            (Strategy::MacdCrossover { .. }, Snapshot::Macd(macd)) => {
                match macd.point_at(index).map(|p| &p.value) {
                    Some(IndicatorValue::Macd { line, signal, .. }) => {
                        if line > signal && !holding {
                            Signal::Buy
                        } else if line < signal && holding {
                            Signal::Sell
                        } else {
                            Signal::Hold
                        }
                    }
                    _ => Signal::Hold,
                }
            }
            (Strategy::BuyAndHold, _) => {
                if holding {
                    Signal::Hold
                } else {
                    Signal::Buy
                }
            }
            // snapshot always matches the strategy it was built from
            _ => Signal::Hold,
        }
    }
}
