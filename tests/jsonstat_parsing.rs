use chrono::NaiveDate;
use eurostat_macro::api::parse_response;
use eurostat_macro::error::ApiError;
use eurostat_macro::models::{DateWindow, GEO_TIME_HEADER, RawCell};
use eurostat_macro::reshape::reshape;

// Trimmed `prc_hicp_manr` response for PL and DE; DE lacks 2021-02.
const SAMPLE: &str = r#"
{
  "version": "2.0",
  "class": "dataset",
  "label": "HICP - monthly data (annual rate of change)",
  "id": ["freq", "unit", "coicop", "geo", "time"],
  "size": [1, 1, 1, 2, 3],
  "dimension": {
    "freq": {"label": "Time frequency", "category": {"index": {"M": 0}, "label": {"M": "Monthly"}}},
    "unit": {"label": "Unit of measure", "category": {"index": {"RCH_A": 0}}},
    "coicop": {"label": "COICOP", "category": {"index": {"CP00": 0}}},
    "geo": {"label": "Geopolitical entity", "category": {"index": {"DE": 0, "PL": 1}}},
    "time": {"label": "Time", "category": {"index": {"2021-01": 0, "2021-02": 1, "2021-03": 2}}}
  },
  "value": {"0": 1.6, "2": 2.0, "3": 2.6, "4": 2.7, "5": 3.9},
  "status": {"2": "p"}
}
"#;

#[test]
fn cube_flattens_to_tsv_layout() {
    let v: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
    let raw = parse_response(v, 200).unwrap();
    assert_eq!(
        raw.header,
        vec!["freq", "unit", "coicop", GEO_TIME_HEADER, "2021-01", "2021-02", "2021-03"]
    );
    assert_eq!(raw.rows.len(), 2);
    assert_eq!(raw.rows[0][3], RawCell::Text("DE".into()));
    assert_eq!(raw.rows[0][4], RawCell::Number(1.6));
    assert_eq!(raw.rows[0][5], RawCell::Missing);
    assert_eq!(raw.rows[1][3], RawCell::Text("PL".into()));
    assert_eq!(raw.rows[1][6], RawCell::Number(3.9));
}

#[test]
fn cube_reshapes_with_gap_dropped() {
    let v: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
    let raw = parse_response(v, 200).unwrap();
    let window = DateWindow::new(
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
    );
    let t = reshape(&raw, &["PL".to_string(), "DE".to_string()], "_hicp", window).unwrap();
    assert_eq!(t.columns, vec!["PL_hicp", "DE_hicp"]);
    assert_eq!(
        t.dates,
        vec![
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()
        ]
    );
    assert_eq!(t.values, vec![vec![2.6, 1.6], vec![3.9, 2.0]]);
}

#[test]
fn dense_value_array_is_accepted() {
    let body = r#"{
      "id": ["geo", "time"],
      "size": [1, 2],
      "dimension": {
        "geo": {"category": {"index": ["PL"]}},
        "time": {"category": {"index": ["2021-Q1", "2021-Q2"]}}
      },
      "value": [10.5, null]
    }"#;
    let raw = parse_response(serde_json::from_str(body).unwrap(), 200).unwrap();
    assert_eq!(raw.header, vec![GEO_TIME_HEADER, "2021-Q1", "2021-Q2"]);
    assert_eq!(
        raw.rows,
        vec![vec![
            RawCell::Text("PL".into()),
            RawCell::Number(10.5),
            RawCell::Missing
        ]]
    );
}

#[test]
fn error_payload_becomes_typed_error() {
    let body = serde_json::json!({
        "error": [{"status": 400, "id": 100, "label": "No results found for the query"}]
    });
    let err = parse_response(body, 400).unwrap_err();
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Eurostat { status, label }) => {
            assert_eq!(*status, 400);
            assert!(label.contains("No results"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn mismatched_sizes_are_rejected() {
    let body = serde_json::json!({
        "id": ["geo", "time"],
        "size": [2, 1],
        "dimension": {
            "geo": {"category": {"index": {"PL": 0}}},
            "time": {"category": {"index": {"2021": 0}}}
        },
        "value": {}
    });
    let err = parse_response(body, 200).unwrap_err();
    assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Shape(_))));
}
