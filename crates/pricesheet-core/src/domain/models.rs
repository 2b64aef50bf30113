use serde::{Deserialize, Serialize};

use crate::{DateRange, Symbol, TradingDate, ValidationError};

/// One export request as typed by the user. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub company: String,
    pub start: TradingDate,
    pub end: TradingDate,
}

impl Query {
    pub fn new(
        company: impl Into<String>,
        start: TradingDate,
        end: TradingDate,
    ) -> Result<Self, ValidationError> {
        let company = company.into();
        if company.trim().is_empty() {
            return Err(ValidationError::EmptyCompany);
        }

        Ok(Self {
            company,
            start,
            end,
        })
    }

    /// Build a query from the three raw prompt answers (dates as `DD-MM-YYYY`).
    pub fn parse(company: &str, start: &str, end: &str) -> Result<Self, ValidationError> {
        let start = TradingDate::parse_display(start)?;
        let end = TradingDate::parse_display(end)?;
        Self::new(company, start, end)
    }

    pub const fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }
}

/// Single hit of a symbol search, in provider order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: Symbol,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub quote_type: Option<String>,
}

impl Instrument {
    pub fn new(symbol: Symbol, name: Option<String>) -> Self {
        Self {
            symbol,
            name,
            exchange: None,
            quote_type: None,
        }
    }

    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = Some(exchange.into());
        self
    }

    pub fn with_quote_type(mut self, quote_type: impl Into<String>) -> Self {
        self.quote_type = Some(quote_type.into());
        self
    }
}

/// One trading day of unadjusted OHLCV data.
///
/// Price fields are optional because the provider occasionally reports a
/// day with some values missing; such days are kept with empty cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub date: TradingDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<u64>,
}

impl PriceRow {
    pub fn new(date: TradingDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            adj_close: Some(close),
            volume: Some(volume),
        }
    }

    pub fn with_adj_close(mut self, adj_close: Option<f64>) -> Self {
        self.adj_close = adj_close;
        self
    }

    /// True when the provider sent a timestamp without any price.
    pub fn has_no_prices(&self) -> bool {
        self.open.is_none() && self.high.is_none() && self.low.is_none() && self.close.is_none()
    }
}
