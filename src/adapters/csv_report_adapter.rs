//! CSV report adapter.
//!
//! Writes two files into the output directory: `equity_curve.csv` (one row
//! per bar) and `transactions.csv` (one row per executed order).

use crate::domain::backtest::BacktestResult;
use crate::domain::error::FlintsteelError;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), FlintsteelError> {
        let dir = Path::new(output_path);
        fs::create_dir_all(dir)?;

        let mut equity = csv::Writer::from_path(dir.join("equity_curve.csv"))
            .map_err(csv_io_error)?;
        equity
            .write_record(["date", "equity"])
            .map_err(csv_io_error)?;
        for point in &result.equity_curve {
            equity
                .write_record([point.date.to_string(), format!("{:.2}", point.equity)])
                .map_err(csv_io_error)?;
        }
        equity.flush()?;

        let mut transactions = csv::Writer::from_path(dir.join("transactions.csv"))
            .map_err(csv_io_error)?;
        transactions
            .write_record(["date", "side", "price", "units", "resulting_cash"])
            .map_err(csv_io_error)?;
        for tx in &result.transactions {
            transactions
                .write_record([
                    tx.date.to_string(),
                    tx.side.as_str().to_string(),
                    format!("{:.4}", tx.price),
                    tx.units.to_string(),
                    format!("{:.2}", tx.resulting_cash),
                ])
                .map_err(csv_io_error)?;
        }
        transactions.flush()?;

        Ok(())
    }
}

fn csv_io_error(e: csv::Error) -> FlintsteelError {
    FlintsteelError::Data {
        reason: format!("failed to write report: {}", e),
    }
}
