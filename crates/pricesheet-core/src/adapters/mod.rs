//! Market data source implementations.
//!
//! | Adapter | Use |
//! |---------|-----|
//! | [`YahooAdapter`] | Yahoo Finance search and chart endpoints |
//! | [`FixtureSource`] | Offline deterministic data (`--mock`, tests) |

mod fixture;
mod yahoo;

pub use fixture::FixtureSource;
pub use yahoo::{parse_chart_response, parse_search_response, YahooAdapter, YahooAuthManager};
