//! CSV file data adapter.
//!
//! Expects one `<code>.csv` per instrument under the base path, with a
//! header row of `date,open,high,low,close,volume` and ISO dates.

use crate::domain::error::FlintsteelError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code))
    }
}

fn field<'a>(record: &'a StringRecord, index: usize, name: &str) -> Result<&'a str, FlintsteelError> {
    record.get(index).ok_or_else(|| FlintsteelError::Data {
        reason: format!("missing {} column", name),
    })
}

fn parse_number<T: std::str::FromStr>(
    record: &StringRecord,
    index: usize,
    name: &str,
) -> Result<T, FlintsteelError>
where
    T::Err: std::fmt::Display,
{
    field(record, index, name)?
        .trim()
        .parse()
        .map_err(|e| FlintsteelError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, FlintsteelError> {
        let path = self.csv_path(code);
        let content = fs::read_to_string(&path)?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| FlintsteelError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str = field(&record, 0, "date")?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                FlintsteelError::Data {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            if start_date.is_some_and(|start| date < start)
                || end_date.is_some_and(|end| date > end)
            {
                continue;
            }

            bars.push(Bar {
                date,
                open: parse_number(&record, 1, "open")?,
                high: parse_number(&record, 2, "high")?,
                low: parse_number(&record, 3, "low")?,
                close: parse_number(&record, 4, "close")?,
                volume: parse_number(&record, 5, "volume")?,
            });
        }

        if bars.is_empty() {
            return Err(FlintsteelError::NoData {
                code: code.to_string(),
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}
