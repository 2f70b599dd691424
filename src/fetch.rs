//! Measure-parameterized fetch: resolve countries, query once, reshape, filter.
//!
//! ```no_run
//! use eurostat_macro::api::EurostatClient;
//! use eurostat_macro::fetch::{Query, get_rates};
//! use eurostat_macro::models::Tenor;
//!
//! let client = EurostatClient::default();
//! let q = Query::since("2015-01-01")?.countries(["Poland", "Germany"]);
//! let rates = get_rates(&client, &q, Tenor::ThreeMonth)?;
//! println!("{:?}", rates.columns); // ["PL_M3_rate", "DE_M3_rate"]
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::api::DataSource;
use crate::countries::{self, DEFAULT_COUNTRY};
use crate::models::{DateWindow, Measure, SeriesTable, Tenor};
use crate::reshape::{parse_date, reshape};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use log::info;

/// Date window and countries for one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub start: NaiveDate,
    /// `None` means today, evaluated when the fetch runs.
    pub end: Option<NaiveDate>,
    /// English display names (see [`countries::COUNTRY_CODES`]).
    pub countries: Vec<String>,
}

impl Query {
    /// Start at `start` (`YYYY-MM-DD`), end today, for the default country.
    pub fn since(start: &str) -> Result<Self> {
        Ok(Self {
            start: parse_date(start)?,
            end: None,
            countries: vec![DEFAULT_COUNTRY.to_string()],
        })
    }

    /// Inclusive end date (`YYYY-MM-DD`).
    pub fn until(mut self, end: &str) -> Result<Self> {
        self.end = Some(parse_date(end)?);
        Ok(self)
    }

    pub fn countries<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start, self.end.unwrap_or_else(|| Local::now().date_naive()))
    }
}

/// Fetch `measure` for the query's countries and window.
///
/// Unknown country names are skipped with a warning. When none resolve, the
/// request still goes out with no geo filter and the result has no columns.
pub fn fetch<D: DataSource + ?Sized>(source: &D, measure: Measure, query: &Query) -> Result<SeriesTable> {
    let geo = countries::resolve(&query.countries);
    let cfg = measure.config();
    let window = query.window();

    let mut filters = cfg.filters.clone();
    filters.push(("geo".to_string(), geo.clone()));

    info!(
        "fetching {} for {:?} ({}..={})",
        cfg.dataset, geo, window.start, window.end
    );
    let raw = source
        .get_data(cfg.dataset, &filters)
        .with_context(|| format!("fetch dataset {}", cfg.dataset))?;
    reshape(&raw, &geo, &cfg.suffix, window)
        .with_context(|| format!("reshape dataset {}", cfg.dataset))
}

/// Quarterly GDP, columns `<geo>_gdp`.
pub fn get_gdp<D: DataSource + ?Sized>(source: &D, query: &Query) -> Result<SeriesTable> {
    fetch(source, Measure::Gdp, query)
}

/// Monthly unemployment rate, columns `<geo>_unempl`.
pub fn get_unemployment<D: DataSource + ?Sized>(source: &D, query: &Query) -> Result<SeriesTable> {
    fetch(source, Measure::Unemployment, query)
}

/// HICP annual rate of change, columns `<geo>_hicp`.
pub fn get_hicp<D: DataSource + ?Sized>(source: &D, query: &Query) -> Result<SeriesTable> {
    fetch(source, Measure::Inflation, query)
}

/// Short-term interest rates, columns `<geo>_<tenor>_rate`.
pub fn get_rates<D: DataSource + ?Sized>(
    source: &D,
    query: &Query,
    tenor: Tenor,
) -> Result<SeriesTable> {
    fetch(source, Measure::InterestRate(tenor), query)
}
