//! Market data source contract and request/response types.
//!
//! | Endpoint | Request | Response | Description |
//! |----------|---------|----------|-------------|
//! | Search | [`SearchRequest`] | [`SearchBatch`] | Company name / keyword lookup |
//! | History | [`HistoryRequest`] | [`PriceFrame`] | Daily unadjusted OHLCV bars |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{DateRange, Instrument, PriceFrame, Symbol};

/// Data endpoint, used in error messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Search,
    History,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::History => "history",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Transport failure or non-success HTTP status.
    Unavailable,
    /// The provider answered, but with an error payload (unknown symbol, bad range, ...).
    Rejected,
    /// The provider answered with a body we could not decode.
    Malformed,
    InvalidRequest,
}

/// Structured adapter error; propagated to the user unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Rejected,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Malformed,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Rejected => "source.rejected",
            SourceErrorKind::Malformed => "source.malformed",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SourceError {}

/// Free-text instrument lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Result<Self, SourceError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(SourceError::invalid_request(
                "search query must not be empty",
            ));
        }
        Ok(Self { query })
    }
}

/// Daily, unadjusted bars for one symbol over `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: Symbol,
    pub range: DateRange,
}

impl HistoryRequest {
    pub fn new(symbol: Symbol, range: DateRange) -> Self {
        Self { symbol, range }
    }
}

impl Display for HistoryRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} 1d {}..{}",
            self.symbol,
            self.range.start.format_iso(),
            self.range.end.format_iso()
        )
    }
}

/// Search hits in provider order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBatch {
    pub query: String,
    pub results: Vec<Instrument>,
}

/// Market data source contract.
///
/// | Method | Description |
/// |--------|-------------|
/// | [`name`](MarketDataSource::name) | Provider name for logs |
/// | [`search`](MarketDataSource::search) | Look up instruments by name or keyword |
/// | [`history`](MarketDataSource::history) | Fetch daily bars as a [`PriceFrame`] |
pub trait MarketDataSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Searches for instruments matching a free-text query.
    ///
    /// An empty result set is not an error at this level.
    fn search<'a>(
        &'a self,
        req: SearchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SearchBatch, SourceError>> + Send + 'a>>;

    /// Fetches daily, unadjusted bars.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport failures, non-success statuses,
    /// provider error payloads and undecodable bodies. A range without
    /// trading days yields an empty frame, not an error.
    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceFrame, SourceError>> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TradingDate;

    #[test]
    fn blank_search_query_is_rejected() {
        let err = SearchRequest::new("  ").expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::InvalidRequest);
        assert_eq!(err.code(), "source.invalid_request");
    }

    #[test]
    fn history_request_displays_iso_range() {
        let range = DateRange::new(
            TradingDate::parse_display("01-01-2024").expect("valid"),
            TradingDate::parse_display("05-01-2024").expect("valid"),
        );
        let req = HistoryRequest::new(Symbol::parse("AAPL").expect("valid"), range);
        assert_eq!(req.to_string(), "AAPL 1d 2024-01-01..2024-01-05");
    }

    #[test]
    fn error_display_is_the_provider_message() {
        let err = SourceError::rejected("No data found, symbol may be delisted");
        assert_eq!(err.to_string(), "No data found, symbol may be delisted");
        assert_eq!(err.code(), "source.rejected");
    }
}
