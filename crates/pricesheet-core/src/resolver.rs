//! Company name to ticker symbol lookup.

use thiserror::Error;
use tracing::{debug, info};

use crate::data_source::{MarketDataSource, SearchRequest, SourceError};
use crate::{Symbol, ValidationError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("No stock symbol found for '{query}'")]
    SymbolNotFound { query: String },
    /// The search call itself failed.
    #[error("symbol search failed: {0}")]
    Source(#[from] SourceError),
}

/// Symbol of the first search hit for `company`, exactly as the provider
/// spells it.
///
/// Blank input is rejected without contacting the source.
pub async fn resolve_symbol(
    source: &dyn MarketDataSource,
    company: &str,
) -> Result<Symbol, ResolveError> {
    if company.trim().is_empty() {
        return Err(ValidationError::EmptyCompany.into());
    }

    let request = SearchRequest::new(company)?;
    let batch = source.search(request).await?;
    debug!(
        source = source.name(),
        query = company,
        hits = batch.results.len(),
        "symbol search answered"
    );

    let symbol = batch
        .results
        .into_iter()
        .next()
        .map(|instrument| instrument.symbol)
        .ok_or_else(|| ResolveError::SymbolNotFound {
            query: company.to_owned(),
        })?;

    info!(query = company, %symbol, "resolved symbol");
    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FixtureSource, Instrument};

    fn instrument(symbol: &str) -> Instrument {
        Instrument::new(Symbol::parse(symbol).expect("valid"), None)
    }

    #[tokio::test]
    async fn first_hit_wins_verbatim() {
        let source = FixtureSource::default()
            .with_catalog(vec![instrument("brk-b"), instrument("BRK-A")]);

        let symbol = resolve_symbol(&source, "brk").await.expect("resolves");
        assert_eq!(symbol.as_str(), "brk-b");
    }

    #[tokio::test]
    async fn no_hits_names_the_query() {
        let source = FixtureSource::default();
        let err = resolve_symbol(&source, "Zzyzx Holdings")
            .await
            .expect_err("must fail");

        assert_eq!(
            err,
            ResolveError::SymbolNotFound {
                query: String::from("Zzyzx Holdings")
            }
        );
        assert_eq!(err.to_string(), "No stock symbol found for 'Zzyzx Holdings'");
    }

    #[tokio::test]
    async fn blank_company_never_reaches_the_source() {
        let source = FixtureSource::default();
        let err = resolve_symbol(&source, "   ").await.expect_err("must fail");

        assert_eq!(err, ResolveError::Validation(ValidationError::EmptyCompany));
        assert_eq!(source.search_calls(), 0);
    }
}
