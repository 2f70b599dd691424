use crate::models::SeriesTable;
use crate::summary::InstrumentSummary;
use anyhow::Result;
use csv::WriterBuilder;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Save a table as wide CSV: `date,<col1>,<col2>,...`.
pub fn save_csv<P: AsRef<Path>>(table: &SeriesTable, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    let mut header = Vec::with_capacity(table.width() + 1);
    header.push("date".to_string());
    header.extend(table.columns.iter().cloned());
    wtr.write_record(&header)?;
    for (date, row) in table.dates.iter().zip(&table.values) {
        let mut rec = Vec::with_capacity(row.len() + 1);
        rec.push(date.format("%Y-%m-%d").to_string());
        rec.extend(row.iter().map(|v| v.to_string()));
        wtr.write_record(&rec)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save a table as a pretty JSON array of records: `[{"date": "...", "<col>": value}, ...]`.
pub fn save_json<P: AsRef<Path>>(table: &SeriesTable, path: P) -> Result<()> {
    let records: Vec<Value> = table
        .dates
        .iter()
        .zip(&table.values)
        .map(|(date, row)| {
            let mut obj = Map::new();
            obj.insert("date".into(), Value::String(date.format("%Y-%m-%d").to_string()));
            for (col, v) in table.columns.iter().zip(row) {
                obj.insert(col.clone(), serde_json::json!(v));
            }
            Value::Object(obj)
        })
        .collect();
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(&records)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save a merged instrument summary as CSV (one row per date, empty cells where absent).
pub fn save_summary_csv<P: AsRef<Path>>(summary: &InstrumentSummary, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize((
        "date",
        "close",
        "dividend",
        "fx",
        "close_home",
        "dividend_home",
        "dividend_rate",
    ))?;
    for r in &summary.rows {
        wtr.serialize((
            r.date.format("%Y-%m-%d").to_string(),
            r.close,
            r.dividend,
            r.fx,
            r.close_home,
            r.dividend_home,
            r.dividend_rate,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}
