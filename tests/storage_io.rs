use chrono::NaiveDate;
use eurostat_macro::models::SeriesTable;
use eurostat_macro::storage;
use eurostat_macro::summary::{InstrumentSummary, SummaryRow};
use tempfile::tempdir;

fn sample() -> SeriesTable {
    SeriesTable {
        dates: vec![
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 2, 1).unwrap(),
        ],
        columns: vec!["PL_M3_rate".into(), "EA_M3_rate".into()],
        values: vec![vec![0.21, -0.55], vec![0.21, -0.54]],
    }
}

#[test]
fn csv_is_wide_with_date_first() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rates.csv");
    storage::save_csv(&sample(), &path).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["date", "PL_M3_rate", "EA_M3_rate"]
    );
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[1][0], "2021-02-01");
    assert_eq!(rows[1][2].parse::<f64>().unwrap(), -0.54);
}

#[test]
fn json_is_an_array_of_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rates.json");
    storage::save_json(&sample(), &path).unwrap();

    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["date"], "2021-01-01");
    assert_eq!(arr[0]["EA_M3_rate"], -0.55);
}

#[test]
fn empty_table_writes_header_only() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    storage::save_csv(&SeriesTable::default(), &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "date\n");
}

#[test]
fn summary_csv_leaves_absent_values_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("summary.csv");
    let summary = InstrumentSummary {
        symbol: "X".into(),
        currency: "EUR".into(),
        home: "PLN".into(),
        fx_symbol: Some("EURPLN=X".into()),
        rows: vec![SummaryRow {
            date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            close: None,
            dividend: None,
            fx: Some(4.31),
            close_home: None,
            dividend_home: None,
            dividend_rate: None,
        }],
    };
    storage::save_summary_csv(&summary, &path).unwrap();
    let txt = std::fs::read_to_string(&path).unwrap();
    let mut lines = txt.lines();
    assert_eq!(
        lines.next(),
        Some("date,close,dividend,fx,close_home,dividend_home,dividend_rate")
    );
    assert_eq!(lines.next(), Some("2024-03-02,,,4.31,,,"));
}
