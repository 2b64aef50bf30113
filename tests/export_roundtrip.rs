//! Spreadsheet round trip: what is written is what a reader gets back.

use calamine::{open_workbook, Data, Reader, Xlsx};
use pricesheet_core::{
    normalize, output_file_name, write_xlsx, PriceFrame, PriceRow, PriceSheet, SheetRow, Symbol,
    TradingDate,
};
use proptest::prelude::*;
use tempfile::tempdir;

fn read_rows(path: &std::path::Path) -> (Vec<String>, Vec<Vec<Data>>) {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("workbook opens");
    let names = workbook.sheet_names();
    let range = workbook
        .worksheet_range(&names[0])
        .expect("worksheet readable");
    (names, range.rows().map(<[Data]>::to_vec).collect())
}

#[test]
fn one_sheet_with_header_and_no_index_column() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("sheet.xlsx");
    let sheet = PriceSheet::new(vec![SheetRow {
        date: String::from("02-01-2024"),
        open: Some(187.15),
        high: Some(188.44),
        low: Some(183.89),
        close: Some(185.64),
        volume: Some(82_488_700),
    }]);

    write_xlsx(&path, &sheet).expect("export succeeds");

    let (names, rows) = read_rows(&path);
    assert_eq!(names.len(), 1);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], Data::String(String::from("Date")));
    assert_eq!(rows[0][5], Data::String(String::from("Volume")));
    assert_eq!(rows[1][0], Data::String(String::from("02-01-2024")));
    assert_eq!(rows[1][3], Data::Float(183.89));
}

#[test]
fn missing_prices_become_empty_cells() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("gaps.xlsx");
    let sheet = PriceSheet::new(vec![
        SheetRow {
            date: String::from("02-01-2024"),
            open: Some(10.0),
            high: None,
            low: Some(9.5),
            close: Some(9.8),
            volume: None,
        },
        SheetRow {
            date: String::from("03-01-2024"),
            open: Some(9.8),
            high: Some(10.4),
            low: Some(9.7),
            close: Some(10.1),
            volume: Some(0),
        },
    ]);

    write_xlsx(&path, &sheet).expect("export succeeds");

    let (_, rows) = read_rows(&path);
    assert_eq!(rows[1][2], Data::Empty);
    assert_eq!(rows[1][5], Data::Empty);
    assert_eq!(rows[2][5], Data::Float(0.0));
}

#[test]
fn written_file_uses_the_derived_name() {
    let dir = tempdir().expect("tempdir");
    let start = TradingDate::parse_display("01-07-2024").expect("valid");
    let end = TradingDate::parse_display("16-07-2024").expect("valid");
    let path = dir.path().join(output_file_name("Tesla Inc", start, end));

    write_xlsx(&path, &PriceSheet::default()).expect("export succeeds");

    assert!(dir.path().join("Tesla_Inc_01-07_to_16-07.xlsx").is_file());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn row_count_and_dates_survive_the_round_trip(
        offsets in prop::collection::btree_set(0_i64..5_000, 0..30),
    ) {
        let symbol = Symbol::parse("AAPL").expect("valid");
        let rows: Vec<PriceRow> = offsets
            .iter()
            .map(|offset| {
                let day = TradingDate::from_unix_timestamp(946_684_800 + offset * 86_400, 0)
                    .expect("in range");
                PriceRow::new(day, 1.0, 2.0, 0.5, 1.5, *offset as u64)
            })
            .collect();
        let sheet = normalize(PriceFrame::from_rows(&symbol, &rows, true)).expect("normalizes");

        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("prop.xlsx");
        write_xlsx(&path, &sheet).expect("export succeeds");

        let (_, read) = read_rows(&path);
        prop_assert_eq!(read.len(), sheet.len() + 1);
        let read_dates: Vec<String> = read[1..]
            .iter()
            .map(|row| match &row[0] {
                Data::String(value) => value.clone(),
                other => format!("{other:?}"),
            })
            .collect();
        let expected: Vec<String> = sheet.dates().map(str::to_owned).collect();
        prop_assert_eq!(read_dates, expected);
    }
}
