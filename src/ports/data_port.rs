//! Data access port trait.

use crate::domain::error::FlintsteelError;
use crate::domain::ohlcv::Bar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Fetches bars for one code, optionally clipped to a date range.
    /// Bars are returned oldest first.
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, FlintsteelError>;
}
