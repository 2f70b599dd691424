//! Instrument metadata and daily market data.
//!
//! - [`InstrumentCatalog`]: a local CSV of known instruments (`symbol,currency,...`).
//! - [`MarketData`]: daily close and dividend history for a ticker.
//! - [`YahooClient`]: [`MarketData`] backed by the Yahoo Finance v8 chart endpoint.

use crate::api::http_client;
use crate::error::ApiError;
use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use percent_encoding::{NON_ALPHANUMERIC, AsciiSet};
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

/// One catalog entry. Every CSV column is kept in `fields`, in file order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub currency: Option<String>,
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentCatalog {
    instruments: Vec<Instrument>,
}

impl InstrumentCatalog {
    /// Load from a CSV file with at least a `symbol` column (a `currency` column is optional).
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("open instrument catalog {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("read {}", path.display()))
    }

    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(rdr);
        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let col = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let Some(sym_col) = col("symbol") else {
            bail!("instrument catalog has no `symbol` column");
        };
        let cur_col = col("currency");

        let mut instruments = Vec::new();
        for rec in rdr.records() {
            let rec = rec?;
            let symbol = rec.get(sym_col).unwrap_or("").trim().to_string();
            if symbol.is_empty() {
                continue;
            }
            let currency = cur_col
                .and_then(|i| rec.get(i))
                .map(|c| c.trim().to_ascii_uppercase())
                .filter(|c| !c.is_empty());
            let fields = headers
                .iter()
                .cloned()
                .zip(rec.iter().map(|v| v.trim().to_string()))
                .collect();
            instruments.push(Instrument {
                symbol,
                currency,
                fields,
            });
        }
        debug!("instrument catalog: {} entries", instruments.len());
        Ok(Self { instruments })
    }

    pub fn get(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments
            .iter()
            .find(|i| i.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

/// One trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: Option<f64>,
    /// Cash dividend paid on this day; 0 when none.
    pub dividend: f64,
}

/// Daily history, ascending by date with unique dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub symbol: String,
    pub currency: Option<String>,
    pub bars: Vec<PriceBar>,
}

impl PriceHistory {
    /// Build from unordered bars; a later bar for the same date wins, dividends add up.
    pub fn from_bars(symbol: impl Into<String>, currency: Option<String>, bars: Vec<PriceBar>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, PriceBar> = BTreeMap::new();
        for b in bars {
            by_date
                .entry(b.date)
                .and_modify(|e| {
                    if b.close.is_some() {
                        e.close = b.close;
                    }
                    e.dividend += b.dividend;
                })
                .or_insert(b);
        }
        Self {
            symbol: symbol.into(),
            currency,
            bars: by_date.into_values().collect(),
        }
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }
}

/// Source of daily price histories.
pub trait MarketData {
    /// Full available daily history of `symbol`, with dividends.
    fn daily_history(&self, symbol: &str) -> Result<PriceHistory>;
}

impl<T: MarketData + ?Sized> MarketData for &T {
    fn daily_history(&self, symbol: &str) -> Result<PriceHistory> {
        (**self).daily_history(symbol)
    }
}

/// Yahoo ticker for the rate converting `from` into `to`, e.g. `EURPLN=X`.
pub fn fx_symbol(from: &str, to: &str) -> String {
    format!("{}{}=X", from.to_ascii_uppercase(), to.to_ascii_uppercase())
}

// v8 chart response

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
    #[serde(default)]
    pub events: Option<Events>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    pub currency: Option<String>,
    /// Exchange offset from UTC in seconds; used to date bars in exchange time.
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct Events {
    #[serde(default)]
    pub dividends: HashMap<String, DividendEvent>,
}

#[derive(Debug, Deserialize)]
pub struct DividendEvent {
    pub amount: f64,
    pub date: i64,
}

fn exchange_date(ts: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(ts + gmtoffset, 0).map(|dt| dt.date_naive())
}

/// Decode a v8 chart response into a [`PriceHistory`].
pub fn parse_chart(symbol: &str, body: &str) -> Result<PriceHistory> {
    let env: ChartEnvelope = serde_json::from_str(body).context("parse chart json")?;
    if let Some(e) = env.chart.error {
        return Err(ApiError::Market {
            symbol: symbol.to_string(),
            description: format!("{}: {}", e.code, e.description),
        }
        .into());
    }
    let res = env
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ApiError::Shape(format!("chart for {symbol} has no result")))?;

    let offset = res.meta.gmtoffset;
    let closes = res
        .indicators
        .quote
        .first()
        .map(|q| q.close.as_slice())
        .unwrap_or(&[]);
    let mut bars: Vec<PriceBar> = res
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            Some(PriceBar {
                date: exchange_date(ts, offset)?,
                close: closes.get(i).copied().flatten(),
                dividend: 0.0,
            })
        })
        .collect();
    if let Some(ev) = res.events {
        for d in ev.dividends.values() {
            if let Some(date) = exchange_date(d.date, offset) {
                bars.push(PriceBar {
                    date,
                    close: None,
                    dividend: d.amount,
                });
            }
        }
    }
    Ok(PriceHistory::from_bars(res.meta.symbol, res.meta.currency, bars))
}

#[derive(Debug, Clone)]
pub struct YahooClient {
    pub base_url: String,
    http: HttpClient,
}

pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// 1900-01-01T00:00:00Z, i.e. "everything available".
const HISTORY_START: i64 = -2_208_988_800;

// Tickers carry `=`, `^` and `.`; keep `.`/`-` readable.
const SYMBOL_SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.');

impl Default for YahooClient {
    fn default() -> Self {
        Self::with_base_url(YAHOO_BASE_URL)
    }
}

impl YahooClient {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: http_client(),
        }
    }

    pub fn chart_url(&self, symbol: &str, until: i64) -> String {
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=div",
            self.base_url,
            percent_encoding::utf8_percent_encode(symbol.trim(), SYMBOL_SAFE),
            HISTORY_START,
            until
        )
    }
}

impl MarketData for YahooClient {
    fn daily_history(&self, symbol: &str) -> Result<PriceHistory> {
        let url = self.chart_url(symbol, Utc::now().timestamp());
        info!("GET {url}");
        let resp = self
            .http
            .get(&url)
            .send()
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status();
        let body = resp.text().with_context(|| format!("read body of {url}"))?;
        match parse_chart(symbol, &body) {
            Ok(h) => Ok(h),
            Err(e) if !status.is_success() => {
                Err(e.context(format!("request failed with HTTP {status}")))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fx_symbol_is_uppercased() {
        assert_eq!(fx_symbol("eur", "pln"), "EURPLN=X");
    }

    #[test]
    fn chart_url_encodes_equals_sign() {
        let c = YahooClient::with_base_url("http://y/");
        let url = c.chart_url("EURPLN=X", 0);
        assert!(url.starts_with("http://y/v8/finance/chart/EURPLN%3DX?period1=-2208988800&period2=0"));
    }

    #[test]
    fn exchange_date_applies_offset() {
        // 2024-01-02T23:30:00Z is already Jan 3 in UTC+1.
        let ts = 1_704_238_200;
        assert_eq!(exchange_date(ts, 0), NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(exchange_date(ts, 3600), NaiveDate::from_ymd_opt(2024, 1, 3));
    }
}
