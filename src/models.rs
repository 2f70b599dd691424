use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite header Eurostat uses for the geo dimension column.
pub const GEO_TIME_HEADER: &str = "geo\\TIME_PERIOD";
/// Canonical name the composite header is renamed to.
pub const GEO: &str = "geo";

/// Maturity selector for short-term interest rates (`irt_st_m`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tenor {
    /// Day-to-day (overnight).
    Overnight,
    OneMonth,
    ThreeMonth,
    SixMonth,
    #[default]
    TwelveMonth,
}

impl Tenor {
    pub const ALL: [Tenor; 5] = [
        Tenor::Overnight,
        Tenor::OneMonth,
        Tenor::ThreeMonth,
        Tenor::SixMonth,
        Tenor::TwelveMonth,
    ];

    /// Eurostat tenor code (`DTD`, `M1`, `M3`, `M6`, `M12`).
    pub fn code(&self) -> &'static str {
        match self {
            Tenor::Overnight => "DTD",
            Tenor::OneMonth => "M1",
            Tenor::ThreeMonth => "M3",
            Tenor::SixMonth => "M6",
            Tenor::TwelveMonth => "M12",
        }
    }

    pub fn from_code(code: &str) -> Option<Tenor> {
        Tenor::ALL
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(code.trim()))
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The tracked macroeconomic indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measure {
    /// Quarterly GDP at current prices, national currency, seasonally and calendar adjusted.
    Gdp,
    /// Monthly unemployment rate, total population, seasonally adjusted.
    Unemployment,
    /// HICP annual rate of change, all items.
    Inflation,
    /// Monthly short-term interest rate for the given tenor.
    InterestRate(Tenor),
}

/// Everything that distinguishes one measure's query and output from another's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureConfig {
    pub dataset: &'static str,
    /// Fixed filter dimensions; `geo` is appended per request.
    pub filters: Vec<(String, Vec<String>)>,
    /// Appended to each geo code to form the output column name.
    pub suffix: String,
}

fn dims(pairs: &[(&str, &str)]) -> Vec<(String, Vec<String>)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), vec![v.to_string()]))
        .collect()
}

impl Measure {
    pub fn config(&self) -> MeasureConfig {
        match self {
            Measure::Gdp => MeasureConfig {
                dataset: "namq_10_gdp",
                filters: dims(&[("s_adj", "SCA"), ("unit", "CP_MNAC"), ("na_item", "B1GQ")]),
                suffix: "_gdp".into(),
            },
            Measure::Unemployment => MeasureConfig {
                dataset: "une_rt_m",
                filters: dims(&[
                    ("age", "TOTAL"),
                    ("s_adj", "SA"),
                    ("sex", "T"),
                    ("unit", "PC_ACT"),
                ]),
                suffix: "_unempl".into(),
            },
            Measure::Inflation => MeasureConfig {
                dataset: "prc_hicp_manr",
                filters: dims(&[("coicop", "CP00")]),
                suffix: "_hicp".into(),
            },
            Measure::InterestRate(tenor) => MeasureConfig {
                dataset: "irt_st_m",
                filters: vec![("int_rt".into(), vec![format!("IRT_{}", tenor.code())])],
                suffix: format!("_{}_rate", tenor.code()),
            },
        }
    }

    /// Human-readable name, used for chart captions.
    pub fn label(&self) -> String {
        match self {
            Measure::Gdp => "GDP (current prices, national currency)".into(),
            Measure::Unemployment => "Unemployment rate (% of active population)".into(),
            Measure::Inflation => "HICP inflation (annual rate of change, %)".into(),
            Measure::InterestRate(t) => format!("Interest rate {} (%)", t.code()),
        }
    }
}

/// One cell of a raw Eurostat row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    Number(f64),
    Text(String),
    Missing,
}

impl RawCell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawCell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Coerce to a numeric observation.
    pub fn observation(&self) -> Observation {
        match self {
            RawCell::Number(v) if v.is_finite() => Observation::Value(*v),
            RawCell::Number(_) | RawCell::Missing => Observation::Missing,
            RawCell::Text(s) => {
                // Eurostat TSV can carry flags after the value: "1.5 p", ": c"
                let head = s.split_whitespace().next().unwrap_or("");
                if head.is_empty() || head == ":" {
                    return Observation::Missing;
                }
                match head.parse::<f64>() {
                    Ok(v) if v.is_finite() => Observation::Value(v),
                    Ok(_) => Observation::Missing,
                    Err(_) => Observation::NotNumeric,
                }
            }
        }
    }
}

/// Result of coercing a raw cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    Value(f64),
    /// `null`, empty, NaN or Eurostat's `:`.
    Missing,
    /// Text that does not parse as a number (a dimension code, for instance).
    NotNumeric,
}

impl From<&str> for RawCell {
    fn from(s: &str) -> Self {
        RawCell::Text(s.to_string())
    }
}

impl From<f64> for RawCell {
    fn from(v: f64) -> Self {
        RawCell::Number(v)
    }
}

impl From<Option<f64>> for RawCell {
    fn from(v: Option<f64>) -> Self {
        v.map(RawCell::Number).unwrap_or(RawCell::Missing)
    }
}

/// Tabular response: a header of field names followed by parallel rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Self { header, rows }
    }

    /// Build from a list of rows where row 0 is the header.
    pub fn from_rows(mut rows: Vec<Vec<RawCell>>) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let header = rows
            .remove(0)
            .into_iter()
            .map(|c| match c {
                RawCell::Text(s) => s,
                RawCell::Number(v) => v.to_string(),
                RawCell::Missing => String::new(),
            })
            .collect();
        Self { header, rows }
    }
}

/// Inclusive calendar-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Membership in the set of calendar days `start..=end`; empty when `start > end`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Date-indexed, one column per country series. `values[row][col]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesTable {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl SeriesTable {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.columns.is_empty()
    }

    /// Number of date rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// `(date, value)` pairs for a named column.
    pub fn column(&self, name: &str) -> Option<Vec<(NaiveDate, f64)>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(
            self.dates
                .iter()
                .zip(&self.values)
                .map(|(d, row)| (*d, row[idx]))
                .collect(),
        )
    }

    /// Keep only rows on or after `date`.
    pub fn since(&self, date: NaiveDate) -> SeriesTable {
        let (dates, values) = self
            .dates
            .iter()
            .zip(&self.values)
            .filter(|(d, _)| **d >= date)
            .map(|(d, row)| (*d, row.clone()))
            .unzip();
        SeriesTable {
            dates,
            columns: self.columns.clone(),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_config_follows_tenor() {
        let cfg = Measure::InterestRate(Tenor::ThreeMonth).config();
        assert_eq!(cfg.dataset, "irt_st_m");
        assert_eq!(cfg.filters, vec![("int_rt".to_string(), vec!["IRT_M3".to_string()])]);
        assert_eq!(cfg.suffix, "_M3_rate");
        assert_eq!(Tenor::default(), Tenor::TwelveMonth);
        assert_eq!(Tenor::from_code("dtd"), Some(Tenor::Overnight));
        assert_eq!(Tenor::from_code("Y10"), None);
    }

    #[test]
    fn cell_coercion() {
        assert_eq!(RawCell::from("1.5 p").observation(), Observation::Value(1.5));
        assert_eq!(RawCell::from(": c").observation(), Observation::Missing);
        assert_eq!(RawCell::from("").observation(), Observation::Missing);
        assert_eq!(RawCell::from("PL").observation(), Observation::NotNumeric);
        assert_eq!(RawCell::from(None).observation(), Observation::Missing);
        assert_eq!(RawCell::from(f64::NAN).observation(), Observation::Missing);

        let cells: Vec<RawCell> = serde_json::from_str(r#"[1.25, "PL", null]"#).unwrap();
        assert_eq!(cells, vec![RawCell::Number(1.25), RawCell::from("PL"), RawCell::Missing]);
    }

    #[test]
    fn window_is_inclusive() {
        let d = |day| NaiveDate::from_ymd_opt(2021, 1, day).unwrap();
        let w = DateWindow::new(d(1), d(31));
        assert!(w.contains(d(1)) && w.contains(d(31)));
        assert!(!DateWindow::new(d(2), d(1)).contains(d(1)));
    }
}
