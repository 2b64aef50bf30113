//! Spreadsheet output.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use thiserror::Error;
use tracing::info;

use crate::{PriceSheet, TradingDate};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write spreadsheet '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },
}

/// `{company}_{DD-MM}_to_{DD-MM}.xlsx`, spaces in the company replaced by
/// underscores.
///
/// ```rust
/// use pricesheet_core::{output_file_name, TradingDate};
///
/// let start = TradingDate::parse_display("01-07-2024")?;
/// let end = TradingDate::parse_display("16-07-2024")?;
/// assert_eq!(output_file_name("Tesla Inc", start, end), "Tesla_Inc_01-07_to_16-07.xlsx");
/// # Ok::<(), pricesheet_core::ValidationError>(())
/// ```
pub fn output_file_name(company: &str, start: TradingDate, end: TradingDate) -> String {
    format!(
        "{}_{}_to_{}.xlsx",
        company.replace(' ', "_"),
        start.format_day_month(),
        end.format_day_month()
    )
}

/// Write `sheet` as the only worksheet of a new workbook at `path`,
/// replacing any existing file. Header row first, no index column.
pub fn write_xlsx(path: &Path, sheet: &PriceSheet) -> Result<(), ExportError> {
    let wrap = |source: XlsxError| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    fill_worksheet(worksheet, sheet).map_err(wrap)?;
    workbook.save(path).map_err(wrap)?;

    info!(path = %path.display(), rows = sheet.len(), "wrote spreadsheet");
    Ok(())
}

fn fill_worksheet(worksheet: &mut Worksheet, sheet: &PriceSheet) -> Result<(), XlsxError> {
    let header = Format::new().set_bold();
    for (col, name) in (0_u16..).zip(PriceSheet::COLUMNS) {
        worksheet.write_string_with_format(0, col, name, &header)?;
    }

    for (row, data) in (1_u32..).zip(sheet.rows()) {
        worksheet.write_string(row, 0, data.date.as_str())?;

        let prices = [data.open, data.high, data.low, data.close];
        for (col, value) in (1_u16..).zip(prices) {
            if let Some(value) = value {
                worksheet.write_number(row, col, value)?;
            }
        }

        if let Some(volume) = data.volume {
            worksheet.write_number(row, 5, volume as f64)?;
        }
    }

    Ok(())
}
