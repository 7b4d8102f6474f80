//! Cash and position bookkeeping for a single-instrument backtest.
//!
//! [`PositionManager`] owns the cash balance, the held unit count and the
//! transaction log. Orders that cannot be honoured (insufficient cash,
//! nothing held) are not errors: they are recorded as [`Rejection`]s and the
//! run continues. Cash and units can never go negative.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

/// One executed order.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub bar_index: usize,
    pub date: NaiveDate,
    pub side: Side,
    pub price: f64,
    pub units: i64,
    pub resulting_cash: f64,
}

/// One order that could not be honoured. Kept so the CLI can surface them
/// after the run.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub bar_index: usize,
    pub date: NaiveDate,
    pub side: Side,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct PositionManager {
    cash: f64,
    held_units: i64,
    entry_price: Option<f64>,
    stop_loss: f64,
    take_profit: f64,
    transactions: Vec<Transaction>,
    rejections: Vec<Rejection>,
}

impl PositionManager {
    /// `stop_loss` and `take_profit` are fractional thresholds relative to
    /// the entry price; 0.0 disables the corresponding control.
    pub fn new(initial_cash: f64, stop_loss: f64, take_profit: f64) -> Self {
        PositionManager {
            cash: initial_cash,
            held_units: 0,
            entry_price: None,
            stop_loss,
            take_profit,
            transactions: Vec::new(),
            rejections: Vec::new(),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn held_units(&self) -> i64 {
        self.held_units
    }

    pub fn entry_price(&self) -> Option<f64> {
        self.entry_price
    }

    pub fn is_holding(&self) -> bool {
        self.held_units > 0
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    /// Cash plus the value of held units at `price`.
    pub fn market_value(&self, price: f64) -> f64 {
        self.cash + self.held_units as f64 * price
    }

    /// Buys `units` at `price`. Rejected (not an error) when the cash
    /// balance cannot cover the cost or the order is degenerate.
    pub fn buy(&mut self, bar_index: usize, date: NaiveDate, price: f64, units: i64) {
        if units <= 0 || price <= 0.0 {
            self.reject(bar_index, date, Side::Buy, format!(
                "degenerate buy of {units} units at {price}"
            ));
            return;
        }

        let cost = units as f64 * price;
        if cost > self.cash {
            self.reject(bar_index, date, Side::Buy, format!(
                "insufficient cash: need {cost:.2}, have {:.2}",
                self.cash
            ));
            return;
        }

        self.cash -= cost;
        self.held_units += units;
        if self.entry_price.is_none() {
            self.entry_price = Some(price);
        }
        self.transactions.push(Transaction {
            bar_index,
            date,
            side: Side::Buy,
            price,
            units,
            resulting_cash: self.cash,
        });
    }

    /// Buys as many whole units as the cash balance covers at `price`.
    pub fn buy_all(&mut self, bar_index: usize, date: NaiveDate, price: f64) {
        if price <= 0.0 {
            self.reject(
                bar_index,
                date,
                Side::Buy,
                format!("cannot size an order at price {price}"),
            );
            return;
        }
        let units = (self.cash / price).floor() as i64;
        if units == 0 {
            self.reject(
                bar_index,
                date,
                Side::Buy,
                format!("insufficient cash: {:.2} buys no units at {price:.2}", self.cash),
            );
            return;
        }
        self.buy(bar_index, date, price, units);
    }

    /// Sells `units` at `price`. Rejected when more units are asked for
    /// than are held.
    pub fn sell(&mut self, bar_index: usize, date: NaiveDate, price: f64, units: i64) {
        if units <= 0 || price <= 0.0 {
            self.reject(bar_index, date, Side::Sell, format!(
                "degenerate sell of {units} units at {price}"
            ));
            return;
        }
        if units > self.held_units {
            self.reject(bar_index, date, Side::Sell, format!(
                "insufficient units: asked {units}, hold {}",
                self.held_units
            ));
            return;
        }

        self.cash += units as f64 * price;
        self.held_units -= units;
        if self.held_units == 0 {
            self.entry_price = None;
        }
        self.transactions.push(Transaction {
            bar_index,
            date,
            side: Side::Sell,
            price,
            units,
            resulting_cash: self.cash,
        });
    }

    /// Sells the entire position at `price`. No-op rejection when flat.
    pub fn sell_all(&mut self, bar_index: usize, date: NaiveDate, price: f64) {
        if self.held_units == 0 {
            self.reject(bar_index, date, Side::Sell, "no units held".to_string());
            return;
        }
        let units = self.held_units;
        self.sell(bar_index, date, price, units);
    }

    /// Closes the whole position when the bar's close breaches the stop-loss
    /// or take-profit threshold relative to the entry price. Returns true
    /// when a forced sell executed.
    pub fn apply_risk_controls(&mut self, bar_index: usize, date: NaiveDate, close: f64) -> bool {
        let Some(entry) = self.entry_price else {
            return false;
        };
        if self.held_units == 0 {
            return false;
        }

        let take = self.take_profit > 0.0 && close >= entry * (1.0 + self.take_profit);
        let stop = self.stop_loss > 0.0 && close <= entry * (1.0 - self.stop_loss);
        if take || stop {
            let units = self.held_units;
            self.sell(bar_index, date, close, units);
            return true;
        }
        false
    }

    fn reject(&mut self, bar_index: usize, date: NaiveDate, side: Side, reason: String) {
        self.rejections.push(Rejection {
            bar_index,
            date,
            side,
            reason,
        });
    }
}
