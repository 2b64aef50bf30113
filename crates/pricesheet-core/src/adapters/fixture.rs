use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use time::Weekday;

use crate::data_source::{
    HistoryRequest, MarketDataSource, SearchBatch, SearchRequest, SourceError,
};
use crate::{Instrument, PriceFrame, PriceRow, Symbol, TradingDate};

/// Offline source with a small instrument catalog and synthetic weekday bars.
///
/// Backs the `--mock` flag and the behavior tests. Everything it returns is
/// derived from the request, so repeated runs produce identical files.
#[derive(Debug)]
pub struct FixtureSource {
    catalog: Vec<Instrument>,
    rows: Option<Vec<PriceRow>>,
    grouped: bool,
    history_error: Option<SourceError>,
    search_calls: AtomicUsize,
    history_calls: AtomicUsize,
}

impl Default for FixtureSource {
    fn default() -> Self {
        Self {
            catalog: fixture_catalog(),
            rows: None,
            grouped: true,
            history_error: None,
            search_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
        }
    }
}

impl FixtureSource {
    pub fn with_catalog(mut self, catalog: Vec<Instrument>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Serve exactly these rows for every history request.
    pub fn with_rows(mut self, rows: Vec<PriceRow>) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Serve single-level headers instead of `(field, symbol)` pairs.
    pub fn with_flat_headers(mut self) -> Self {
        self.grouped = false;
        self
    }

    pub fn with_history_error(mut self, error: SourceError) -> Self {
        self.history_error = Some(error);
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    fn execute_search(&self, req: SearchRequest) -> SearchBatch {
        self.search_calls.fetch_add(1, Ordering::SeqCst);

        let terms: Vec<String> = req
            .query
            .split_whitespace()
            .map(|term| {
                term.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .filter(|term| !term.is_empty())
            .collect();

        let results = self
            .catalog
            .iter()
            .filter(|instrument| {
                let symbol = instrument.symbol.as_str().to_lowercase();
                let name = instrument
                    .name
                    .as_deref()
                    .unwrap_or_default()
                    .to_lowercase();
                !terms.is_empty()
                    && terms
                        .iter()
                        .all(|term| symbol.contains(term) || name.contains(term))
            })
            .cloned()
            .collect();

        SearchBatch {
            query: req.query,
            results,
        }
    }

    fn execute_history(&self, req: HistoryRequest) -> Result<PriceFrame, SourceError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = &self.history_error {
            return Err(error.clone());
        }

        let rows = match &self.rows {
            Some(rows) => rows.clone(),
            None => synthetic_rows(&req),
        };

        Ok(PriceFrame::from_rows(&req.symbol, &rows, self.grouped))
    }
}

impl MarketDataSource for FixtureSource {
    fn name(&self) -> &'static str {
        "fixture"
    }

    fn search<'a>(
        &'a self,
        req: SearchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SearchBatch, SourceError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.execute_search(req)) })
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceFrame, SourceError>> + Send + 'a>> {
        Box::pin(async move { self.execute_history(req) })
    }
}

/// One bar per weekday in `[start, end)`; an inverted range yields nothing.
fn synthetic_rows(req: &HistoryRequest) -> Vec<PriceRow> {
    let seed = symbol_seed(&req.symbol);
    let end = req.range.end.into_inner();
    let mut day = req.range.start.into_inner();
    let mut rows = Vec::new();

    while day < end {
        if !matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday) {
            let index = rows.len() as u64;
            let base = 90.0 + ((seed + index) % 350) as f64 / 10.0;
            let close = base + 0.30;
            rows.push(
                PriceRow::new(
                    TradingDate::from_date(day),
                    base,
                    base + 1.20,
                    base - 0.80,
                    close,
                    20_000 + index * 25,
                )
                .with_adj_close(Some(close - 0.45)),
            );
        }
        match day.next_day() {
            Some(next) => day = next,
            None => break,
        }
    }

    rows
}

fn fixture_catalog() -> Vec<Instrument> {
    [
        ("AAPL", "Apple Inc.", "NMS", "EQUITY"),
        ("MSFT", "Microsoft Corporation", "NMS", "EQUITY"),
        ("TSLA", "Tesla, Inc.", "NMS", "EQUITY"),
        ("SPY", "SPDR S&P 500 ETF Trust", "PCX", "ETF"),
        ("QQQ", "Invesco QQQ Trust", "NMS", "ETF"),
    ]
    .into_iter()
    .filter_map(|(symbol, name, exchange, quote_type)| {
        let symbol = Symbol::parse(symbol).ok()?;
        Some(
            Instrument::new(symbol, Some(name.to_owned()))
                .with_exchange(exchange)
                .with_quote_type(quote_type),
        )
    })
    .collect()
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(u64::from(byte))
    })
}
