use calamine::{open_workbook, Reader, Xlsx};
use mapgrab_core::{export_stem, Business, BusinessList, Exporter};
use mapgrab_integration_tests::coffee_shop_records;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_zero_listings_exports_header_row_only() {
    let dir = tempdir().unwrap();
    let exporter = Exporter::new(dir.path());

    let (xlsx_path, csv_path) = exporter
        .save(&BusinessList::new(), &export_stem("empty town query"))
        .unwrap();

    let content = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert_eq!(content.lines().next().unwrap(), Business::COLUMNS.join(","));

    let mut workbook: Xlsx<_> = open_workbook(&xlsx_path).unwrap();
    let worksheets = workbook.worksheets();
    let (_, range) = worksheets.first().unwrap();
    assert_eq!(range.rows().count(), 1);
}

#[test]
fn test_coffee_shop_austin_export() {
    let dir = tempdir().unwrap();
    let exporter = Exporter::new(dir.path());

    let stem = export_stem("coffee shop austin");
    let (_, csv_path) = exporter.save(&coffee_shop_records(), &stem).unwrap();

    assert_eq!(
        csv_path.file_name().unwrap(),
        "google_maps_data_coffee_shop_austin.csv"
    );

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        Business::COLUMNS.to_vec()
    );

    let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][6], "30.27");
    assert_eq!(&rows[0][7], "-97.74");
    assert_eq!(&rows[1][6], "30.28");
    assert_eq!(&rows[1][7], "-97.75");

    // A record with every optional field absent still carries coordinates.
    assert_eq!(&rows[1][0], "");
    assert_eq!(&rows[1][4], "");
}

#[test]
fn test_csv_and_xlsx_round_trip_identically() {
    let dir = tempdir().unwrap();
    let exporter = Exporter::new(dir.path());

    let (xlsx_path, csv_path) = exporter
        .save(&coffee_shop_records(), &export_stem("coffee shop austin"))
        .unwrap();

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let mut csv_rows = vec![reader
        .headers()
        .unwrap()
        .iter()
        .map(String::from)
        .collect::<Vec<_>>()];
    for record in reader.records() {
        csv_rows.push(record.unwrap().iter().map(String::from).collect());
    }

    let mut workbook: Xlsx<_> = open_workbook(&xlsx_path).unwrap();
    let worksheets = workbook.worksheets();
    let (_, range) = worksheets.first().unwrap();
    let xlsx_rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    assert_eq!(csv_rows.len(), xlsx_rows.len());
    for (csv_row, xlsx_row) in csv_rows.iter().zip(&xlsx_rows) {
        for (i, csv_cell) in csv_row.iter().enumerate() {
            let xlsx_cell = xlsx_row.get(i).map(String::as_str).unwrap_or("");
            assert_eq!(csv_cell, xlsx_cell, "column {} differs", i);
        }
    }
}

#[test]
fn test_consecutive_exports_are_independent() {
    let dir = tempdir().unwrap();
    let exporter = Exporter::new(dir.path());

    exporter
        .save(&coffee_shop_records(), &export_stem("coffee shop austin"))
        .unwrap();
    let (_, csv_path) = exporter
        .save(&BusinessList::new(), &export_stem("dentist dallas"))
        .unwrap();

    // The second query's export carries none of the first query's records.
    let content = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(content.lines().count(), 1);
}
