//! # Domain Models
//!
//! Canonical domain types for pricesheet.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Query`] | Company name plus the requested date span |
//! | [`Symbol`] | Ticker symbol exactly as the provider spells it |
//! | [`Instrument`] | One symbol search hit |
//! | [`PriceRow`] | One trading day of OHLCV data |
//! | [`TradingDate`] | Calendar date with `DD-MM-YYYY` parsing/formatting |
//! | [`DateRange`] | Half-open `[start, end)` span |
//!
//! Input is validated at construction time:
//!
//! ```rust
//! use pricesheet_core::{Query, ValidationError};
//!
//! let query = Query::parse("Tesla Inc", "01-07-2024", "16-07-2024")?;
//! assert_eq!(query.start.format_iso(), "2024-07-01");
//!
//! let invalid = Query::parse("Tesla Inc", "2024-07-01", "16-07-2024");
//! assert!(matches!(invalid, Err(ValidationError::InvalidDate { .. })));
//! # Ok::<(), ValidationError>(())
//! ```

mod date;
mod models;
mod symbol;

pub use date::{DateRange, TradingDate};
pub use models::{Instrument, PriceRow, Query};
pub use symbol::Symbol;
