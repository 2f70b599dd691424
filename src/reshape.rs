//! Long-to-wide pivot of a raw Eurostat table.
//!
//! Raw rows are one per country with one column per period; the output is one
//! row per date with one column per requested country. Period columns that
//! hold any missing observation among the selected rows are dropped whole.

use crate::models::{DateWindow, GEO, GEO_TIME_HEADER, Observation, RawTable, SeriesTable};
use anyhow::{Result, anyhow, bail};
use chrono::NaiveDate;
use log::{debug, warn};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static PERIOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<y>\d{4})(?:-?Q(?P<q>[1-4])|-?S(?P<s>[12])|-?W(?P<w>\d{2})|-?M?(?P<m>\d{2})(?:-(?P<d>\d{2}))?)?$",
    )
    .expect("period regex")
});

/// Parse a Eurostat period label into the calendar date of its first day.
///
/// `2021` → 2021-01-01, `2021-Q2` → 2021-04-01, `2021-03` / `2021M03` →
/// 2021-03-01, `2021-S2` → 2021-07-01, `2021-W05` → Monday of ISO week 5,
/// `2021-03-15` as is.
pub fn parse_period(label: &str) -> Option<NaiveDate> {
    let caps = PERIOD.captures(label.trim())?;
    let year: i32 = caps.name("y")?.as_str().parse().ok()?;
    let num = |k: &str| caps.name(k).and_then(|m| m.as_str().parse::<u32>().ok());

    if let Some(q) = num("q") {
        return NaiveDate::from_ymd_opt(year, (q - 1) * 3 + 1, 1);
    }
    if let Some(s) = num("s") {
        return NaiveDate::from_ymd_opt(year, (s - 1) * 6 + 1, 1);
    }
    if let Some(w) = num("w") {
        return NaiveDate::from_isoywd_opt(year, w, chrono::Weekday::Mon);
    }
    match (num("m"), num("d")) {
        (Some(m), Some(d)) => NaiveDate::from_ymd_opt(year, m, d),
        (Some(m), None) => NaiveDate::from_ymd_opt(year, m, 1),
        _ => NaiveDate::from_ymd_opt(year, 1, 1),
    }
}

/// Parse a caller-supplied `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| anyhow!("invalid date {s:?}, expected YYYY-MM-DD: {e}"))
}

/// Header with the composite geo column renamed to `geo`.
pub fn canonical_header(header: &[String]) -> Vec<String> {
    header
        .iter()
        .map(|h| {
            if h == GEO_TIME_HEADER {
                GEO.to_string()
            } else {
                h.clone()
            }
        })
        .collect()
}

/// Pivot `raw` into a date-indexed table.
///
/// - `geo`: resolved codes in output order; duplicates collapse to the first.
/// - `suffix`: appended to each code for the column name.
/// - `window`: inclusive date filter applied last.
///
/// Codes with no matching row are absent from the output. An empty `raw`
/// yields an empty table.
///
/// ### Errors
/// The header has rows but no `geo` column, or a kept period label is not a
/// recognisable date.
pub fn reshape(
    raw: &RawTable,
    geo: &[String],
    suffix: &str,
    window: DateWindow,
) -> Result<SeriesTable> {
    if raw.header.is_empty() {
        return Ok(SeriesTable::default());
    }
    let header = canonical_header(&raw.header);
    let Some(geo_col) = header.iter().position(|h| h == GEO) else {
        if raw.rows.is_empty() {
            return Ok(SeriesTable::default());
        }
        bail!("raw table has no {GEO_TIME_HEADER:?} column: {header:?}");
    };

    // Requested codes, first occurrence only, each paired with its row.
    let mut selected: Vec<(&str, usize)> = Vec::new();
    for code in geo {
        if selected.iter().any(|(c, _)| *c == code.as_str()) {
            continue;
        }
        let mut matches = raw.rows.iter().enumerate().filter(|(_, row)| {
            row.get(geo_col).and_then(|c| c.as_text()) == Some(code.as_str())
        });
        match matches.next() {
            Some((i, _)) => {
                if matches.next().is_some() {
                    warn!("several series returned for {code}; using the first");
                }
                selected.push((code.as_str(), i));
            }
            None => debug!("no series returned for {code}"),
        }
    }

    // Period columns that are fully numeric across the selected rows.
    let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    'columns: for (col, label) in header.iter().enumerate().skip(geo_col + 1) {
        let mut values = Vec::with_capacity(selected.len());
        for (code, row) in &selected {
            match raw.rows[*row].get(col).map(|c| c.observation()) {
                Some(Observation::Value(v)) => values.push(v),
                Some(Observation::NotNumeric) => {
                    debug!("dropping non-numeric column {label:?}");
                    continue 'columns;
                }
                Some(Observation::Missing) | None => {
                    debug!("dropping column {label:?}: missing value for {code}");
                    continue 'columns;
                }
            }
        }
        let date = parse_period(label)
            .ok_or_else(|| anyhow!("cannot parse period label {label:?} as a date"))?;
        if by_date.contains_key(&date) {
            warn!("period {label:?} maps to an already seen date {date}; ignored");
            continue;
        }
        by_date.insert(date, values);
    }

    let (dates, values): (Vec<NaiveDate>, Vec<Vec<f64>>) = by_date
        .into_iter()
        .filter(|(d, _)| window.contains(*d))
        .unzip();
    let columns = selected
        .iter()
        .map(|(code, _)| format!("{code}{suffix}"))
        .collect();

    debug!(
        "reshaped {} raw rows into {} dates ({}..={})",
        raw.rows.len(),
        dates.len(),
        window.start,
        window.end
    );
    Ok(SeriesTable {
        dates,
        columns,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn period_labels() {
        assert_eq!(parse_period("2021"), Some(d(2021, 1, 1)));
        assert_eq!(parse_period("2021-Q1"), Some(d(2021, 1, 1)));
        assert_eq!(parse_period("2021Q3"), Some(d(2021, 7, 1)));
        assert_eq!(parse_period("2021-03"), Some(d(2021, 3, 1)));
        assert_eq!(parse_period("2021M11"), Some(d(2021, 11, 1)));
        assert_eq!(parse_period("2021-S2"), Some(d(2021, 7, 1)));
        assert_eq!(parse_period("2021-W01"), Some(d(2021, 1, 4)));
        assert_eq!(parse_period("2021-03-15"), Some(d(2021, 3, 15)));
        assert_eq!(parse_period(" 2020-02 "), Some(d(2020, 2, 1)));
    }

    #[test]
    fn bad_period_labels() {
        assert_eq!(parse_period("geo"), None);
        assert_eq!(parse_period("2021-13"), None);
        assert_eq!(parse_period("2021-Q5"), None);
        assert_eq!(parse_period("21-01"), None);
    }

    #[test]
    fn caller_dates() {
        assert_eq!(parse_date("2021-01-31").unwrap(), d(2021, 1, 31));
        assert!(parse_date("2021/01/31").is_err());
        assert!(parse_date("2021-02-30").is_err());
    }

    #[test]
    fn header_rename() {
        let h = canonical_header(&["freq".into(), GEO_TIME_HEADER.into(), "2021-01".into()]);
        assert_eq!(h, vec!["freq", "geo", "2021-01"]);
    }
}
