//! eurostat_macro
//!
//! A lightweight Rust library for retrieving Eurostat macroeconomic series
//! (GDP, unemployment, HICP inflation, short-term interest rates) as
//! date-indexed tables, and for comparing an ETF priced in a home currency
//! against them. Pairs with the `esmacro` CLI.
//!
//! ### Features
//! - Resolve English country names to Eurostat geo codes
//! - Fetch one measure for several countries and reshape it to one column per country
//! - Save tables as CSV or JSON; quick per-column statistics
//! - Convert a fund's price and dividends into a home currency
//! - Render SVG/PNG charts, including a fund-vs-macro comparison on a secondary axis
//!
//! ### Example
//! ```no_run
//! use eurostat_macro::{EurostatClient, Query, fetch::get_hicp};
//!
//! let client = EurostatClient::default();
//! let query = Query::since("2019-01-01")?.countries(["Poland", "Germany", "Euro Zone"]);
//! let hicp = get_hicp(&client, &query)?;
//! eurostat_macro::storage::save_csv(&hicp, "hicp.csv")?;
//! eurostat_macro::viz::plot_series(&hicp, "hicp.svg", 1000, 600, "HICP")?;
//! let stats = eurostat_macro::stats::column_summary(&hicp);
//! println!("{:#?}", stats);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod countries;
pub mod error;
pub mod fetch;
pub mod jsonstat;
pub mod market;
pub mod models;
pub mod reshape;
pub mod stats;
pub mod storage;
pub mod summary;
pub mod viz;

pub use api::{DataSource, EurostatClient};
pub use error::{ApiError, SummaryError};
pub use fetch::{Query, fetch};
pub use market::{InstrumentCatalog, MarketData, YahooClient};
pub use models::{Measure, RawCell, RawTable, SeriesTable, Tenor};
