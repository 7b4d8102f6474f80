//! End-to-end backtest tests: config file to metrics, plus property-based
//! invariant checks over random price paths.

mod common;

use common::*;
use flintsteel::adapters::file_config_adapter::FileConfigAdapter;
use flintsteel::cli::{build_backtest_config, build_strategy};
use flintsteel::domain::backtest::{BacktestConfig, BacktestResult, BacktestRunner};
use flintsteel::domain::error::FlintsteelError;
use flintsteel::domain::portfolio::Side;
use flintsteel::domain::strategy::Strategy;
use flintsteel::ports::data_port::DataPort;
use proptest::prelude::*;
use proptest::strategy::Strategy as _;

const CONFIG: &str = r#"
[backtest]
code = BHP
initial_capital = 100000
risk_free_rate = 0.01

[strategy]
name = ma
short_period = 3
long_period = 6
"#;

/// Replays the transaction log from initial capital and checks it lands on
/// the result's final book.
fn replay(result: &BacktestResult, initial_capital: f64) {
    let mut cash = initial_capital;
    let mut units: i64 = 0;

    for tx in &result.transactions {
        match tx.side {
            Side::Buy => {
                cash -= tx.units as f64 * tx.price;
                units += tx.units;
            }
            Side::Sell => {
                cash += tx.units as f64 * tx.price;
                units -= tx.units;
            }
        }
        assert!(
            (cash - tx.resulting_cash).abs() < 1e-6,
            "recorded cash {} diverges from replayed {}",
            tx.resulting_cash,
            cash
        );
        assert!(cash >= -1e-9, "cash went negative during replay");
        assert!(units >= 0, "units went negative during replay");
    }

    assert!((cash - result.final_cash).abs() < 1e-6);
    assert_eq!(units, result.final_units);
}

#[test]
fn config_to_metrics_pipeline() {
    let adapter = FileConfigAdapter::from_string(CONFIG).unwrap();
    let strategy = build_strategy(&adapter).unwrap();
    let config = build_backtest_config(&adapter).unwrap();

    // downtrend, rally, crash: enough movement for a full round trip
    let mut closes: Vec<f64> = (0..10).map(|i| 100.0 - i as f64).collect();
    closes.extend((0..12).map(|i| 91.0 + 3.0 * i as f64));
    closes.extend((0..12).map(|i| 124.0 - 4.0 * i as f64));

    let data_port = MockDataPort::new().with_bars("BHP", make_bars(&closes));
    let bars = data_port.fetch_ohlcv("BHP", None, None).unwrap();
    let series = PriceSeries::new("BHP".to_string(), bars);

    let mut runner = BacktestRunner::new(strategy, config);
    let result = runner.run(&series).unwrap();

    assert_eq!(result.equity_curve.len(), closes.len());
    assert!(!result.transactions.is_empty());
    assert!(result.metrics.max_drawdown <= 0.0);
    replay(&result, config.initial_capital);
}

#[test]
fn buy_and_hold_buys_exactly_once() {
    let series = make_series("BHP", &[100.0, 90.0, 110.0, 105.0, 130.0]);
    let mut runner = BacktestRunner::new(Strategy::BuyAndHold, BacktestConfig::default());
    let result = runner.run(&series).unwrap();

    let buys = result
        .transactions
        .iter()
        .filter(|t| t.side == Side::Buy)
        .count();
    assert_eq!(buys, 1);
    assert_eq!(result.transactions[0].bar_index, 0);
    assert_eq!(result.final_units, 1000);

    // equity tracks the close exactly once fully invested
    let last = result.equity_curve.last().unwrap();
    assert!((last.equity - 130_000.0).abs() < 1e-9);
}

#[test]
fn data_port_errors_surface_as_errors() {
    let data_port = MockDataPort::new().with_error("BHP", "connection dropped");
    assert!(matches!(
        data_port.fetch_ohlcv("BHP", None, None),
        Err(FlintsteelError::Data { .. })
    ));

    let data_port = MockDataPort::new();
    assert!(matches!(
        data_port.fetch_ohlcv("CBA", None, None),
        Err(FlintsteelError::NoData { .. })
    ));
}

#[test]
fn insufficient_capital_records_rejections_not_errors() {
    // one unit costs more than the whole book
    let config = BacktestConfig {
        initial_capital: 50.0,
        ..BacktestConfig::default()
    };
    let series = make_series("BHP", &[100.0, 101.0, 102.0]);
    let mut runner = BacktestRunner::new(Strategy::BuyAndHold, config);
    let result = runner.run(&series).unwrap();

    assert!(result.transactions.is_empty());
    assert!(!result.rejections.is_empty());
    assert!((result.final_cash - 50.0).abs() < f64::EPSILON);
}

#[test]
fn all_strategies_complete_on_realistic_series() {
    let closes: Vec<f64> = (0..250)
        .map(|i| {
            let t = i as f64;
            100.0 + 10.0 * (t / 20.0).sin() + t * 0.05
        })
        .collect();
    let series = make_series("BHP", &closes);

    let strategies = [
        Strategy::moving_average_crossover(50, 200).unwrap(),
        Strategy::rsi_threshold(14, 30.0, 70.0).unwrap(),
        Strategy::bollinger_breakout(20, 2.0).unwrap(),
        Strategy::macd_crossover(12, 26, 9).unwrap(),
        Strategy::BuyAndHold,
    ];

    for strategy in strategies {
        let mut runner = BacktestRunner::new(strategy, BacktestConfig::default());
        let result = runner.run(&series).unwrap();

        assert_eq!(result.equity_curve.len(), closes.len());
        assert!(result.equity_curve.iter().all(|p| p.equity >= 0.0));
        replay(&result, 100_000.0);
    }
}

fn arb_strategy() -> impl proptest::strategy::Strategy<Value = Strategy> {
    prop_oneof![
        (2usize..10, 10usize..30).prop_map(|(s, l)| Strategy::MovingAverageCrossover {
            short_period: s,
            long_period: l,
        }),
        (2usize..20).prop_map(|p| Strategy::RsiThreshold {
            period: p,
            lower: 30.0,
            upper: 70.0,
        }),
        (2usize..20).prop_map(|p| Strategy::BollingerBreakout {
            period: p,
            devfactor: 2.0,
        }),
        (2usize..8, 8usize..20, 2usize..6).prop_map(|(f, s, sig)| Strategy::MacdCrossover {
            fast: f,
            slow: s,
            signal: sig,
        }),
        Just(Strategy::BuyAndHold),
    ]
}

proptest! {
    #[test]
    fn book_never_goes_negative(
        closes in prop::collection::vec(1.0f64..1000.0, 1..100),
        strategy in arb_strategy(),
        stop_loss in 0.0f64..0.5,
        take_profit in 0.0f64..0.5,
    ) {
        let series = make_series("X", &closes);
        let config = BacktestConfig {
            stop_loss,
            take_profit,
            ..BacktestConfig::default()
        };
        let mut runner = BacktestRunner::new(strategy, config);
        let result = runner.run(&series).unwrap();

        prop_assert!(result.final_cash >= 0.0);
        prop_assert!(result.final_units >= 0);
        prop_assert_eq!(result.equity_curve.len(), closes.len());
        for point in &result.equity_curve {
            prop_assert!(point.equity >= 0.0);
        }
        replay(&result, config.initial_capital);
    }

    #[test]
    fn max_drawdown_is_zero_iff_curve_never_dips(
        closes in prop::collection::vec(1.0f64..1000.0, 2..60),
    ) {
        let series = make_series("X", &closes);
        let mut runner = BacktestRunner::new(Strategy::BuyAndHold, BacktestConfig::default());
        let result = runner.run(&series).unwrap();

        prop_assert!(result.metrics.max_drawdown <= 0.0);

        let equity: Vec<f64> = result.equity_curve.iter().map(|p| p.equity).collect();
        let never_dips = equity.windows(2).all(|w| w[1] >= w[0] - 1e-9);
        if never_dips {
            prop_assert!(result.metrics.max_drawdown.abs() < 1e-9);
        } else {
            prop_assert!(result.metrics.max_drawdown < 0.0);
        }
    }

    #[test]
    fn total_return_matches_equity_endpoints(
        closes in prop::collection::vec(1.0f64..1000.0, 1..60),
    ) {
        let series = make_series("X", &closes);
        let mut runner = BacktestRunner::new(Strategy::BuyAndHold, BacktestConfig::default());
        let result = runner.run(&series).unwrap();

        let first = result.equity_curve.first().unwrap().equity;
        let last = result.equity_curve.last().unwrap().equity;
        let expected = (last - first) / first;
        prop_assert!((result.metrics.total_return - expected).abs() < 1e-9);
    }
}
