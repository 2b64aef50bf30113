//! Resolve, fetch, normalize, export.

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, info_span, Instrument as _};
use uuid::Uuid;

use crate::data_source::{HistoryRequest, MarketDataSource, SourceError};
use crate::export::{output_file_name, write_xlsx, ExportError};
use crate::frame::ShapeError;
use crate::normalize::normalize;
use crate::resolver::{resolve_symbol, ResolveError};
use crate::{Query, Symbol};

/// First failure of a run; every stage aborts the rest.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Resolution(#[from] ResolveError),
    #[error("{source}")]
    Fetch {
        symbol: Symbol,
        #[source]
        source: SourceError,
    },
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl PipelineError {
    /// Whether the failure comes from what the user typed rather than from
    /// the provider or the filesystem.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Resolution(ResolveError::Validation(_)))
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub company: String,
    pub symbol: Symbol,
    pub path: PathBuf,
    pub rows: usize,
}

impl Display for PipelineReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cleaned data for '{}' ({}) saved to {}",
            self.company,
            self.symbol,
            self.path.display()
        )
    }
}

/// Runs one query end to end and writes the spreadsheet into `output_dir`.
pub async fn run(
    source: &dyn MarketDataSource,
    query: &Query,
    output_dir: &Path,
) -> Result<PipelineReport, PipelineError> {
    let run_id = Uuid::new_v4();
    let span = info_span!("pipeline", %run_id, source = source.name(), company = %query.company);

    run_stages(source, query, output_dir).instrument(span).await
}

async fn run_stages(
    source: &dyn MarketDataSource,
    query: &Query,
    output_dir: &Path,
) -> Result<PipelineReport, PipelineError> {
    let symbol = resolve_symbol(source, &query.company).await?;

    let request = HistoryRequest::new(symbol.clone(), query.range());
    let frame = source
        .history(request)
        .await
        .map_err(|error| PipelineError::Fetch {
            symbol: symbol.clone(),
            source: error,
        })?;
    info!(%symbol, rows = frame.len(), "fetched price history");

    let sheet = normalize(frame)?;

    let path = output_path(output_dir, &output_file_name(&query.company, query.start, query.end));
    write_xlsx(&path, &sheet)?;

    Ok(PipelineReport {
        company: query.company.clone(),
        symbol,
        path,
        rows: sheet.len(),
    })
}

/// The working directory is left implicit so the confirmation line shows the
/// bare file name.
fn output_path(output_dir: &Path, file_name: &str) -> PathBuf {
    if output_dir.as_os_str().is_empty() || output_dir == Path::new(".") {
        PathBuf::from(file_name)
    } else {
        output_dir.join(file_name)
    }
}
