//! Reshape a fetched [`PriceFrame`] into the fixed export layout.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::frame::{Cell, Column, ShapeError, ADJ_CLOSE, CLOSE, DATE, HIGH, LOW, OPEN, VOLUME};
use crate::{PriceFrame, TradingDate};

/// Normalized table: `Date, Open, High, Low, Close, Volume`, dates as
/// `DD-MM-YYYY` text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSheet {
    rows: Vec<SheetRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetRow {
    pub date: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

impl PriceSheet {
    pub const COLUMNS: [&'static str; 6] = [DATE, OPEN, HIGH, LOW, CLOSE, VOLUME];

    pub fn new(rows: Vec<SheetRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.date.as_str())
    }
}

/// Applies, in order: date index to leading `Date` column, two-level headers
/// collapsed to their first level, `Adj Close` dropped, columns selected in
/// [`PriceSheet::COLUMNS`] order, dates formatted as `DD-MM-YYYY`.
///
/// # Errors
///
/// [`ShapeError::MissingColumn`] when one of the six columns is absent, and
/// [`ShapeError::UnexpectedCell`] when a cell cannot be read as its column's
/// type.
pub fn normalize(mut frame: PriceFrame) -> Result<PriceSheet, ShapeError> {
    frame.reset_index();

    if frame.has_multi_level_headers() {
        frame.flatten_headers();
    }

    let dropped_adj_close = frame.drop_column(ADJ_CLOSE);

    let columns = frame.select(&PriceSheet::COLUMNS)?.into_columns();
    let [date, open, high, low, close, volume]: [Column; 6] =
        columns
            .try_into()
            .map_err(|_: Vec<Column>| ShapeError::MissingColumn {
                column: String::from(DATE),
            })?;

    let height = date.cells.len();
    for column in [&open, &high, &low, &close, &volume] {
        if column.cells.len() != height {
            return Err(ShapeError::LengthMismatch {
                column: column.header.to_string(),
                expected: height,
                actual: column.cells.len(),
            });
        }
    }

    let mut rows = Vec::with_capacity(height);
    for row in 0..height {
        rows.push(SheetRow {
            date: date_text(&date, row)?,
            open: price(&open, row)?,
            high: price(&high, row)?,
            low: price(&low, row)?,
            close: price(&close, row)?,
            volume: whole(&volume, row)?,
        });
    }

    debug!(rows = rows.len(), dropped_adj_close, "normalized price frame");
    Ok(PriceSheet::new(rows))
}

fn unexpected(column: &Column, row: usize) -> ShapeError {
    ShapeError::UnexpectedCell {
        column: column.header.to_string(),
        row,
    }
}

fn date_text(column: &Column, row: usize) -> Result<String, ShapeError> {
    match &column.cells[row] {
        Cell::Date(date) => Ok(date.format_display()),
        Cell::Text(text) => TradingDate::parse_iso(text)
            .or_else(|_| TradingDate::parse_display(text))
            .map(TradingDate::format_display)
            .map_err(|_| unexpected(column, row)),
        _ => Err(unexpected(column, row)),
    }
}

fn price(column: &Column, row: usize) -> Result<Option<f64>, ShapeError> {
    match column.cells[row] {
        Cell::Number(value) => Ok(Some(value)),
        Cell::Integer(value) => Ok(Some(value as f64)),
        Cell::Empty => Ok(None),
        _ => Err(unexpected(column, row)),
    }
}

fn whole(column: &Column, row: usize) -> Result<Option<u64>, ShapeError> {
    match column.cells[row] {
        Cell::Integer(value) => Ok(Some(value)),
        Cell::Number(value) if value.is_finite() && value >= 0.0 => Ok(Some(value.round() as u64)),
        Cell::Empty => Ok(None),
        _ => Err(unexpected(column, row)),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::frame::{ColumnHeader, FETCHED_COLUMNS};
    use crate::data_source::{HistoryRequest, MarketDataSource};
    use crate::{DateRange, FixtureSource, PriceRow, Symbol};

    fn date(text: &str) -> TradingDate {
        TradingDate::parse_display(text).expect("valid date")
    }

    fn symbol() -> Symbol {
        Symbol::parse("AAPL").expect("valid symbol")
    }

    fn sample_rows() -> Vec<PriceRow> {
        vec![
            PriceRow::new(date("02-01-2024"), 187.15, 188.44, 183.89, 185.64, 82_488_700)
                .with_adj_close(Some(184.93)),
            PriceRow::new(date("03-01-2024"), 184.22, 185.88, 183.43, 184.25, 58_414_500)
                .with_adj_close(Some(183.55)),
        ]
    }

    #[test]
    fn grouped_frame_is_reshaped() {
        let frame = PriceFrame::from_rows(&symbol(), &sample_rows(), true);
        let sheet = normalize(frame).expect("normalizes");

        assert_eq!(sheet.len(), 2);
        assert_eq!(
            sheet.rows()[0],
            SheetRow {
                date: String::from("02-01-2024"),
                open: Some(187.15),
                high: Some(188.44),
                low: Some(183.89),
                close: Some(185.64),
                volume: Some(82_488_700),
            }
        );
        assert_eq!(sheet.dates().collect::<Vec<_>>(), ["02-01-2024", "03-01-2024"]);
    }

    #[test]
    fn flat_frame_without_adj_close_is_accepted() {
        let mut frame = PriceFrame::from_rows(&symbol(), &sample_rows(), false);
        assert!(frame.drop_column(ADJ_CLOSE));

        let sheet = normalize(frame).expect("normalizes");
        assert_eq!(sheet.rows()[1].close, Some(184.25));
    }

    #[test]
    fn missing_column_is_named() {
        let mut frame = PriceFrame::from_rows(&symbol(), &sample_rows(), true);
        frame.drop_column(VOLUME);

        assert_eq!(
            normalize(frame),
            Err(ShapeError::MissingColumn {
                column: String::from("Volume")
            })
        );
    }

    #[test]
    fn empty_frame_keeps_layout() {
        let frame = PriceFrame::from_rows(&symbol(), &[], true);
        let sheet = normalize(frame).expect("normalizes");
        assert!(sheet.is_empty());
    }

    #[test]
    fn text_dates_and_extra_columns_are_handled() {
        let mut frame = PriceFrame::default();
        let push = |frame: &mut PriceFrame, name: &str, cells: Vec<Cell>| {
            frame
                .push_column(Column::new(ColumnHeader::flat(name), cells))
                .expect("consistent length");
        };
        push(&mut frame, "Dividends", vec![Cell::Number(0.0)]);
        push(&mut frame, VOLUME, vec![Cell::Number(1200.0)]);
        push(&mut frame, CLOSE, vec![Cell::Number(10.5)]);
        push(&mut frame, LOW, vec![Cell::Integer(10)]);
        push(&mut frame, HIGH, vec![Cell::Empty]);
        push(&mut frame, OPEN, vec![Cell::Number(10.2)]);
        push(&mut frame, DATE, vec![Cell::Text(String::from("2024-07-01"))]);

        let sheet = normalize(frame).expect("normalizes");
        assert_eq!(
            sheet.rows(),
            [SheetRow {
                date: String::from("01-07-2024"),
                open: Some(10.2),
                high: None,
                low: Some(10.0),
                close: Some(10.5),
                volume: Some(1200),
            }]
        );
    }

    #[test]
    fn unreadable_date_cell_is_reported() {
        let mut frame = PriceFrame::from_rows(&symbol(), &sample_rows(), false);
        frame.reset_index();
        let mut columns = frame.into_columns();
        columns[0].cells[1] = Cell::Text(String::from("yesterday"));

        let mut rebuilt = PriceFrame::default();
        for column in columns {
            rebuilt.push_column(column).expect("consistent length");
        }

        assert_eq!(
            normalize(rebuilt),
            Err(ShapeError::UnexpectedCell {
                column: String::from("Date"),
                row: 1
            })
        );
    }

    fn arb_rows() -> impl Strategy<Value = Vec<PriceRow>> {
        prop::collection::btree_set(0_i64..3_000, 0..40).prop_map(|days| {
            days.into_iter()
                .map(|offset| {
                    let day = TradingDate::from_unix_timestamp(1_704_067_200 + offset * 86_400, 0)
                        .expect("in range");
                    PriceRow::new(day, 10.0, 11.0, 9.0, 10.5, offset as u64)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn layout_is_fixed_for_any_source_shape(
            rows in arb_rows(),
            grouped in any::<bool>(),
            with_adj_close in any::<bool>(),
        ) {
            let mut frame = PriceFrame::from_rows(&symbol(), &rows, grouped);
            if !with_adj_close {
                frame.drop_column(ADJ_CLOSE);
            }
            prop_assert_eq!(frame.headers().len(), FETCHED_COLUMNS.len() - usize::from(!with_adj_close));

            let sheet = normalize(frame).expect("normalizes");
            prop_assert_eq!(sheet.len(), rows.len());
            for (row, source) in sheet.rows().iter().zip(&rows) {
                prop_assert_eq!(&row.date, &source.date.format_display());
                prop_assert_eq!(row.volume, source.volume);
            }
        }

        #[test]
        fn normalized_dates_stay_ordered_inside_the_range(
            start_offset in 0_i64..400,
            span in 1_i64..120,
        ) {
            let start = TradingDate::from_unix_timestamp(1_704_067_200 + start_offset * 86_400, 0)
                .expect("in range");
            let end = TradingDate::from_unix_timestamp(
                1_704_067_200 + (start_offset + span) * 86_400,
                0,
            )
            .expect("in range");
            let range = DateRange::new(start, end);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("runtime");
            let frame = runtime
                .block_on(FixtureSource::default().history(HistoryRequest::new(symbol(), range)))
                .expect("fixture history");
            let sheet = normalize(frame).expect("normalizes");

            let dates: Vec<TradingDate> = sheet
                .dates()
                .map(|text| TradingDate::parse_display(text).expect("formatted date"))
                .collect();
            prop_assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
            prop_assert!(dates.iter().all(|day| range.contains(*day)));
        }
    }
}
