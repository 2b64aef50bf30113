//! # Pricesheet Core
//!
//! Turns a company name and a date span into a cleaned daily price
//! spreadsheet.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Market data sources (Yahoo Finance, offline fixture) |
//! | [`config`] | Provider endpoints and transport settings |
//! | [`data_source`] | Data source trait and request/response types |
//! | [`domain`] | Domain models (Query, Symbol, PriceRow, TradingDate) |
//! | [`error`] | Input validation errors |
//! | [`export`] | Output file naming and xlsx writer |
//! | [`frame`] | Loosely shaped fetched price table |
//! | [`http_client`] | HTTP client abstraction |
//! | [`normalize`] | Frame to fixed six-column sheet |
//! | [`pipeline`] | End-to-end run |
//! | [`resolver`] | Company name to ticker symbol |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use pricesheet_core::{pipeline, Query, SourceConfig, YahooAdapter};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = YahooAdapter::new(SourceConfig::from_env())?;
//!     let query = Query::parse("Tesla Inc", "01-07-2024", "16-07-2024")?;
//!
//!     let report = pipeline::run(&source, &query, Path::new(".")).await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌──────────┐
//! │ Resolve  │──▶│  Fetch   │──▶│ Normalize │──▶│  Export  │
//! └──────────┘   └──────────┘   └───────────┘   └──────────┘
//!       │              │
//!       ▼              ▼
//! ┌─────────────────────────┐     ┌──────────────────┐
//! │ MarketDataSource        │────▶│ HttpClient       │
//! │ (Yahoo / Fixture)       │     │ (reqwest)        │
//! └─────────────────────────┘     └──────────────────┘
//! ```

pub mod adapters;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod export;
pub mod frame;
pub mod http_client;
pub mod normalize;
pub mod pipeline;
pub mod resolver;

pub use adapters::{FixtureSource, YahooAdapter};
pub use config::SourceConfig;
pub use data_source::{
    Endpoint, HistoryRequest, MarketDataSource, SearchBatch, SearchRequest, SourceError,
    SourceErrorKind,
};
pub use domain::{DateRange, Instrument, PriceRow, Query, Symbol, TradingDate};
pub use error::ValidationError;
pub use export::{output_file_name, write_xlsx, ExportError};
pub use frame::{Cell, Column, ColumnHeader, PriceFrame, ShapeError};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use normalize::{normalize, PriceSheet, SheetRow};
pub use pipeline::{PipelineError, PipelineReport};
pub use resolver::{resolve_symbol, ResolveError};
