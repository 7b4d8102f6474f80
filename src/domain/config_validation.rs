//! Configuration validation.
//!
//! Checks the whole config file before anything is loaded or run, so a bad
//! file fails with one clear message instead of partway through a backtest.

use crate::domain::error::FlintsteelError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const KNOWN_STRATEGIES: [&str; 5] = ["ma", "rsi", "bollinger", "macd", "buy_and_hold"];

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), FlintsteelError> {
    validate_code(config)?;
    validate_initial_capital(config)?;
    validate_risk_free_rate(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), FlintsteelError> {
    validate_strategy_name(config)?;
    validate_risk_controls(config)?;
    Ok(())
}

fn invalid(key: &str, reason: &str, section: &str) -> FlintsteelError {
    FlintsteelError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_code(config: &dyn ConfigPort) -> Result<(), FlintsteelError> {
    match config.get_string("backtest", "code") {
        None => Err(FlintsteelError::ConfigMissing {
            section: "backtest".to_string(),
            key: "code".to_string(),
        }),
        Some(code) if code.trim().is_empty() => Err(invalid(
            "code",
            "code must not be empty",
            "backtest",
        )),
        Some(_) => Ok(()),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), FlintsteelError> {
    let value = config.get_double("backtest", "initial_capital", 100_000.0);
    if value <= 0.0 {
        return Err(invalid(
            "initial_capital",
            "initial_capital must be positive",
            "backtest",
        ));
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), FlintsteelError> {
    let value = config.get_double("backtest", "risk_free_rate", 0.01);
    if value < 0.0 || value >= 1.0 {
        return Err(invalid(
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
            "backtest",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), FlintsteelError> {
    let start = parse_date(config, "start_date")?;
    let end = parse_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(invalid(
                "start_date",
                "start_date must not be after end_date",
                "backtest",
            ));
        }
    }
    Ok(())
}

// Dates are optional; absent means the full range of the data file.
fn parse_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, FlintsteelError> {
    match config.get_string("backtest", key) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| invalid(key, "expected YYYY-MM-DD", "backtest")),
    }
}

fn validate_strategy_name(config: &dyn ConfigPort) -> Result<(), FlintsteelError> {
    match config.get_string("strategy", "name") {
        None => Err(FlintsteelError::ConfigMissing {
            section: "strategy".to_string(),
            key: "name".to_string(),
        }),
        Some(name) if KNOWN_STRATEGIES.contains(&name.as_str()) => Ok(()),
        Some(name) => Err(invalid(
            "name",
            &format!(
                "unknown strategy '{}', expected one of: {}",
                name,
                KNOWN_STRATEGIES.join(", ")
            ),
            "strategy",
        )),
    }
}

fn validate_risk_controls(config: &dyn ConfigPort) -> Result<(), FlintsteelError> {
    let stop_loss = config.get_double("strategy", "stop_loss", 0.0);
    if stop_loss < 0.0 || stop_loss >= 1.0 {
        return Err(invalid(
            "stop_loss",
            "stop_loss must be in [0, 1)",
            "strategy",
        ));
    }
    let take_profit = config.get_double("strategy", "take_profit", 0.0);
    if take_profit < 0.0 {
        return Err(invalid(
            "take_profit",
            "take_profit must be non-negative",
            "strategy",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    const VALID: &str = r#"
[backtest]
code = BHP
initial_capital = 100000
risk_free_rate = 0.01
start_date = 2023-01-01
end_date = 2024-01-01

[strategy]
name = ma
short_period = 50
long_period = 200
stop_loss = 0.02
take_profit = 0.05
"#;

    #[test]
    fn valid_config_passes() {
        let c = config(VALID);
        assert!(validate_backtest_config(&c).is_ok());
        assert!(validate_strategy_config(&c).is_ok());
    }

    #[test]
    fn missing_code_is_config_missing() {
        let c = config("[backtest]\ninitial_capital = 1000\n");
        assert!(matches!(
            validate_backtest_config(&c),
            Err(FlintsteelError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn non_positive_capital_is_rejected() {
        let c = config("[backtest]\ncode = BHP\ninitial_capital = 0\n");
        assert!(matches!(
            validate_backtest_config(&c),
            Err(FlintsteelError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn out_of_range_risk_free_rate_is_rejected() {
        let c = config("[backtest]\ncode = BHP\nrisk_free_rate = 1.5\n");
        assert!(validate_backtest_config(&c).is_err());
    }

    #[test]
    fn dates_are_optional_but_must_parse() {
        let c = config("[backtest]\ncode = BHP\n");
        assert!(validate_backtest_config(&c).is_ok());

        let c = config("[backtest]\ncode = BHP\nstart_date = 01/02/2024\n");
        assert!(validate_backtest_config(&c).is_err());
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let c = config(
            "[backtest]\ncode = BHP\nstart_date = 2024-06-01\nend_date = 2024-01-01\n",
        );
        assert!(validate_backtest_config(&c).is_err());
    }

    #[test]
    fn unknown_strategy_name_is_rejected() {
        let c = config("[strategy]\nname = momentum\n");
        assert!(matches!(
            validate_strategy_config(&c),
            Err(FlintsteelError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn missing_strategy_name_is_config_missing() {
        let c = config("[strategy]\nstop_loss = 0.02\n");
        assert!(matches!(
            validate_strategy_config(&c),
            Err(FlintsteelError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn bad_risk_controls_are_rejected() {
        let c = config("[strategy]\nname = ma\nstop_loss = 1.5\n");
        assert!(validate_strategy_config(&c).is_err());

        let c = config("[strategy]\nname = ma\ntake_profit = -0.1\n");
        assert!(validate_strategy_config(&c).is_err());
    }
}
