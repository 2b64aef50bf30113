use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::SourceConfig;
use crate::data_source::{
    Endpoint, HistoryRequest, MarketDataSource, SearchBatch, SearchRequest, SourceError,
};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::{Instrument, PriceFrame, PriceRow, Symbol, TradingDate};

const SEARCH_QUOTES_COUNT: usize = 10;
const MAX_CRUMB_LEN: usize = 100;

// ============================================================================
// Yahoo session - cookie/crumb handshake
// ============================================================================

/// Holds the crumb token Yahoo expects next to its session cookie.
///
/// The handshake is:
/// 1. visit `fc.yahoo.com` so the cookie store receives the session cookie
/// 2. read the crumb from `/v1/test/getcrumb`
///
/// It is best effort: the chart endpoint frequently answers without a
/// crumb, so a failed handshake only logs a warning.
#[derive(Debug, Default)]
pub struct YahooAuthManager {
    crumb: Mutex<Option<String>>,
}

impl YahooAuthManager {
    fn cached(&self) -> Option<String> {
        self.crumb
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, crumb: String) {
        *self.crumb.lock().unwrap_or_else(PoisonError::into_inner) = Some(crumb);
    }

    /// Crumb for the current session, fetching it on first use.
    pub async fn crumb(&self, http_client: &dyn HttpClient, config: &SourceConfig) -> Option<String> {
        if let Some(crumb) = self.cached() {
            return Some(crumb);
        }

        match Self::handshake(http_client, config).await {
            Ok(crumb) => {
                debug!("obtained yahoo crumb");
                self.store(crumb.clone());
                Some(crumb)
            }
            Err(reason) => {
                warn!(%reason, "yahoo crumb unavailable, requesting chart without it");
                None
            }
        }
    }

    async fn handshake(http_client: &dyn HttpClient, config: &SourceConfig) -> Result<String, String> {
        // The cookie endpoint answers 404 while still setting the cookie.
        let cookie_request = HttpRequest::get(config.cookie_url.as_str())
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(config.timeout_ms);
        http_client
            .execute(cookie_request)
            .await
            .map_err(|e| format!("cookie request failed: {}", e.message()))?;

        let crumb_request = HttpRequest::get(config.crumb_url.as_str())
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(config.timeout_ms);
        let response = http_client
            .execute(crumb_request)
            .await
            .map_err(|e| format!("crumb request failed: {}", e.message()))?;

        if !response.is_success() {
            return Err(format!("crumb endpoint returned status {}", response.status));
        }

        let body = response.body.trim();
        if body.contains("<html") || body.contains("<!DOCTYPE") {
            return Err(String::from("crumb endpoint returned an html page"));
        }
        if body.to_ascii_lowercase().contains("too many requests") {
            return Err(String::from("crumb endpoint is rate limiting"));
        }
        if body.is_empty() || body.len() >= MAX_CRUMB_LEN || body.contains(char::is_whitespace) {
            return Err(String::from("crumb endpoint returned an unexpected body"));
        }

        Ok(body.to_owned())
    }
}

// ============================================================================
// Yahoo Adapter
// ============================================================================

/// Yahoo Finance adapter: `/v1/finance/search` for symbol lookup and
/// `/v8/finance/chart` for daily history.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    config: SourceConfig,
    auth: HttpAuth,
    auth_manager: Arc<YahooAuthManager>,
}

impl YahooAdapter {
    /// Adapter on a fresh reqwest client.
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let client = ReqwestHttpClient::new(&config)
            .map_err(|e| SourceError::unavailable(e.message().to_owned()))?;
        Ok(Self::with_http_client(Arc::new(client), config))
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: SourceConfig) -> Self {
        let auth = config
            .cookie_override
            .clone()
            .map_or(HttpAuth::None, HttpAuth::Cookie);
        Self {
            http_client,
            config,
            auth,
            auth_manager: Arc::new(YahooAuthManager::default()),
        }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn get(&self, endpoint: Endpoint, url: String) -> Result<HttpResponse, SourceError> {
        debug!(%endpoint, %url, "yahoo request");
        let request = HttpRequest::get(url)
            .with_header("referer", "https://finance.yahoo.com/")
            .with_auth(&self.auth)
            .with_timeout_ms(self.config.timeout_ms);

        self.http_client
            .execute(request)
            .await
            .map_err(|e| {
                SourceError::unavailable(format!("yahoo {endpoint} request failed: {}", e.message()))
            })
    }

    fn search_url(&self, req: &SearchRequest) -> String {
        format!(
            "{}?q={}&quotesCount={}&newsCount=0",
            self.config.search_url,
            urlencoding::encode(&req.query),
            SEARCH_QUOTES_COUNT
        )
    }

    fn chart_url(&self, req: &HistoryRequest, crumb: Option<&str>) -> String {
        let mut url = format!(
            "{}/{}?period1={}&period2={}&interval=1d&includeAdjustedClose=true&events={}",
            self.config.chart_url,
            urlencoding::encode(req.symbol.as_str()),
            req.range.start.unix_midnight(),
            req.range.end.unix_midnight(),
            urlencoding::encode("div,splits")
        );
        if let Some(crumb) = crumb {
            url.push_str("&crumb=");
            url.push_str(&urlencoding::encode(crumb));
        }
        url
    }

    async fn execute_search(&self, req: SearchRequest) -> Result<SearchBatch, SourceError> {
        let response = self.get(Endpoint::Search, self.search_url(&req)).await?;
        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "yahoo search returned status {}",
                response.status
            )));
        }

        let results = parse_search_response(&response.body)?;
        debug!(query = %req.query, hits = results.len(), "yahoo search answered");

        Ok(SearchBatch {
            query: req.query,
            results,
        })
    }

    async fn execute_history(&self, req: HistoryRequest) -> Result<PriceFrame, SourceError> {
        let crumb = match self.auth {
            HttpAuth::None => self.auth_manager.crumb(self.http_client.as_ref(), &self.config).await,
            _ => None,
        };

        let response = self.get(Endpoint::History, self.chart_url(&req, crumb.as_deref())).await?;
        if !response.is_success() {
            // Unknown symbols come back as 404 with an error payload worth surfacing.
            if let Some(error) = chart_error(&response.body) {
                return Err(error);
            }
            return Err(SourceError::unavailable(format!(
                "yahoo chart returned status {}",
                response.status
            )));
        }

        let rows = parse_chart_response(&response.body, &req)?;
        debug!(request = %req, rows = rows.len(), "yahoo chart answered");

        Ok(PriceFrame::from_rows(&req.symbol, &rows, true))
    }
}

impl MarketDataSource for YahooAdapter {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn search<'a>(
        &'a self,
        req: SearchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SearchBatch, SourceError>> + Send + 'a>> {
        Box::pin(self.execute_search(req))
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceFrame, SourceError>> + Send + 'a>> {
        Box::pin(self.execute_history(req))
    }
}

// ============================================================================
// Response parsing
// ============================================================================

/// Search hits with a usable symbol, in provider order.
pub fn parse_search_response(body: &str) -> Result<Vec<Instrument>, SourceError> {
    let response: YahooSearchResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("failed to parse yahoo search response: {e}")))?;

    let results = response
        .quotes
        .into_iter()
        .filter_map(|quote| {
            let symbol = Symbol::parse(quote.symbol.as_deref()?).ok()?;
            let mut instrument =
                Instrument::new(symbol, quote.long_name.or(quote.short_name));
            if let Some(exchange) = quote.exchange {
                instrument = instrument.with_exchange(exchange);
            }
            if let Some(quote_type) = quote.quote_type {
                instrument = instrument.with_quote_type(quote_type);
            }
            Some(instrument)
        })
        .collect();

    Ok(results)
}

/// Daily rows of a chart response, cleaned the way the download library does:
/// rows without any price are dropped, dates outside the requested range are
/// discarded, rows are sorted by date and the first row per date wins.
/// Zero-volume rows are kept.
pub fn parse_chart_response(body: &str, req: &HistoryRequest) -> Result<Vec<PriceRow>, SourceError> {
    let response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = response.chart.error {
        return Err(error.into_source_error());
    }

    let Some(result) = response.chart.result.and_then(|results| results.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let Some(timestamps) = result.timestamp else {
        return Ok(Vec::new());
    };

    let utc_offset = result.meta.and_then(|meta| meta.gmtoffset).unwrap_or(0);
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .and_then(|series| series.into_iter().next())
        .map(|series| series.adjclose)
        .unwrap_or_default();

    let mut rows = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = TradingDate::from_unix_timestamp(ts, utc_offset)
            .map_err(|e| SourceError::malformed(format!("invalid chart timestamp: {e}")))?;

        let row = PriceRow {
            date,
            open: value_at(&quote.open, i),
            high: value_at(&quote.high, i),
            low: value_at(&quote.low, i),
            close: value_at(&quote.close, i),
            adj_close: value_at(&adjclose, i),
            volume: value_at(&quote.volume, i)
                .filter(|v| *v >= 0.0)
                .map(|v| v.round() as u64),
        };

        if row.has_no_prices() || !req.range.contains(row.date) {
            continue;
        }
        rows.push(row);
    }

    rows.sort_by_key(|row| row.date);
    rows.dedup_by_key(|row| row.date);

    Ok(rows)
}

/// Provider error payload of a non-success chart answer, if there is one.
fn chart_error(body: &str) -> Option<SourceError> {
    serde_json::from_str::<YahooChartResponse>(body)
        .ok()?
        .chart
        .error
        .map(YahooChartError::into_source_error)
}

fn value_at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values
        .get(index)
        .copied()
        .flatten()
        .filter(|v| v.is_finite())
}

// Yahoo Finance API response structures
#[derive(Debug, Clone, Deserialize)]
struct YahooSearchResponse {
    #[serde(default)]
    quotes: Vec<YahooSearchQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooSearchQuote {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(rename = "shortname", default)]
    short_name: Option<String>,
    #[serde(rename = "longname", default)]
    long_name: Option<String>,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(rename = "quoteType", default)]
    quote_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl YahooChartError {
    fn into_source_error(self) -> SourceError {
        let message = match (self.code, self.description) {
            (_, Some(description)) if !description.is_empty() => description,
            (Some(code), _) => code,
            _ => String::from("yahoo chart returned an unspecified error"),
        };
        SourceError::rejected(message)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: Option<YahooChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
    #[serde(default)]
    adjclose: Option<Vec<YahooChartAdjClose>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}
