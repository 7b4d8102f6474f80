//! Bar-by-bar backtest execution.
//!
//! A [`BacktestRunner`] is single-use: it walks a price series once, asking
//! the strategy for one signal per bar, filling orders at that bar's close,
//! then applying stop-loss/take-profit against the same close. Equity is
//! marked to market after every bar so the curve has one point per bar.

use crate::domain::error::FlintsteelError;
use crate::domain::metrics::{compute_metrics, Metrics, DEFAULT_RISK_FREE_RATE};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::portfolio::{PositionManager, Rejection, Transaction};
use crate::domain::strategy::{Signal, Strategy, StrategyEngine};
use chrono::NaiveDate;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub risk_free_rate: f64,
    /// Fractional stop-loss below entry; 0.0 disables.
    pub stop_loss: f64,
    /// Fractional take-profit above entry; 0.0 disables.
    pub take_profit: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            stop_loss: 0.0,
            take_profit: 0.0,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), FlintsteelError> {
        if self.initial_capital <= 0.0 || !self.initial_capital.is_finite() {
            return Err(FlintsteelError::invalid_parameter(
                "initial_capital",
                "must be positive",
            ));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(FlintsteelError::invalid_parameter(
                "risk_free_rate",
                "must be finite",
            ));
        }
        if self.stop_loss < 0.0 || self.stop_loss >= 1.0 {
            return Err(FlintsteelError::invalid_parameter(
                "stop_loss",
                "must be in [0, 1)",
            ));
        }
        if self.take_profit < 0.0 {
            return Err(FlintsteelError::invalid_parameter(
                "take_profit",
                "must be non-negative",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    AwaitingData,
    Running,
    Completed,
}

/// Portfolio equity after one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub code: String,
    pub strategy: Strategy,
    pub equity_curve: Vec<EquityPoint>,
    pub transactions: Vec<Transaction>,
    pub rejections: Vec<Rejection>,
    pub metrics: Metrics,
    pub final_cash: f64,
    pub final_units: i64,
}

pub struct BacktestRunner {
    strategy: Strategy,
    config: BacktestConfig,
    state: RunState,
}

impl BacktestRunner {
    pub fn new(strategy: Strategy, config: BacktestConfig) -> Self {
        BacktestRunner {
            strategy,
            config,
            state: RunState::AwaitingData,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Consumes this runner's one shot at the series.
    pub fn run(&mut self, series: &PriceSeries) -> Result<BacktestResult, FlintsteelError> {
        if self.state != RunState::AwaitingData {
            return Err(FlintsteelError::Data {
                reason: "backtest runner has already run".to_string(),
            });
        }
        self.config.validate()?;
        if series.is_empty() {
            return Err(FlintsteelError::EmptySeries);
        }

        // Engine construction is still setup: if it fails, the runner must
        // stay in AwaitingData.
        let bars = series.bars();
        let engine = StrategyEngine::new(self.strategy.clone(), bars)?;

        self.state = RunState::Running;

        let mut portfolio = PositionManager::new(
            self.config.initial_capital,
            self.config.stop_loss,
            self.config.take_profit,
        );
        let mut equity_curve = Vec::with_capacity(bars.len());

        for (i, bar) in bars.iter().enumerate() {
            match engine.decide(i, bar, portfolio.is_holding()) {
                Signal::Buy => portfolio.buy_all(i, bar.date, bar.close),
                Signal::Sell => portfolio.sell_all(i, bar.date, bar.close),
                Signal::Hold => {}
            }
            portfolio.apply_risk_controls(i, bar.date, bar.close);

            equity_curve.push(EquityPoint {
                date: bar.date,
                equity: portfolio.market_value(bar.close),
            });
        }

        let equity: Vec<f64> = equity_curve.iter().map(|p| p.equity).collect();
        let metrics = compute_metrics(&equity, &series.closes(), self.config.risk_free_rate)?;

        self.state = RunState::Completed;

        Ok(BacktestResult {
            code: series.code().to_string(),
            strategy: self.strategy.clone(),
            equity_curve,
            transactions: portfolio.transactions().to_vec(),
            rejections: portfolio.rejections().to_vec(),
            metrics,
            final_cash: portfolio.cash(),
            final_units: portfolio.held_units(),
        })
    }
}
