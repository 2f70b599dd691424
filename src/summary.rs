//! Fund price and dividends converted into a home currency.
//!
//! The fund's daily history and the `<CUR><HOME>=X` exchange-rate history are
//! outer-joined by date. Where both sides have a value the fund's close and
//! dividend are converted and a dividend rate (converted dividend over
//! converted close) is derived.

use crate::error::SummaryError;
use crate::market::{InstrumentCatalog, MarketData, PriceHistory, fx_symbol};
use anyhow::Result;
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Home currency used when none is given.
pub const DEFAULT_HOME_CURRENCY: &str = "PLN";

/// One merged date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub date: NaiveDate,
    /// Fund close in its own currency.
    pub close: Option<f64>,
    /// Fund dividend in its own currency; `None` on dates the fund did not trade.
    pub dividend: Option<f64>,
    pub fx: Option<f64>,
    pub close_home: Option<f64>,
    pub dividend_home: Option<f64>,
    pub dividend_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSummary {
    pub symbol: String,
    pub currency: String,
    pub home: String,
    /// Exchange-rate ticker, or `None` when the fund already trades in the home currency.
    pub fx_symbol: Option<String>,
    pub rows: Vec<SummaryRow>,
}

impl InstrumentSummary {
    /// Last `n` rows with a positive dividend, oldest first.
    pub fn recent_dividends(&self, n: usize) -> Vec<SummaryRow> {
        let paid: Vec<SummaryRow> = self
            .rows
            .iter()
            .filter(|r| r.dividend.is_some_and(|d| d > 0.0))
            .copied()
            .collect();
        paid[paid.len().saturating_sub(n)..].to_vec()
    }

    /// First date the fund has a price.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.iter().find(|r| r.close.is_some()).map(|r| r.date)
    }

    /// `(date, value)` series for plotting.
    pub fn close_series(&self) -> Vec<(NaiveDate, f64)> {
        self.rows
            .iter()
            .filter_map(|r| r.close.map(|c| (r.date, c)))
            .collect()
    }

    pub fn close_home_series(&self) -> Vec<(NaiveDate, f64)> {
        self.rows
            .iter()
            .filter_map(|r| r.close_home.map(|c| (r.date, c)))
            .collect()
    }
}

/// Currency of `symbol`: the explicit override first, then the catalog.
pub fn resolve_currency(
    symbol: &str,
    currency: Option<&str>,
    catalog: Option<&InstrumentCatalog>,
) -> Result<String, SummaryError> {
    if let Some(c) = currency.map(str::trim).filter(|c| !c.is_empty()) {
        return Ok(c.to_ascii_uppercase());
    }
    catalog
        .and_then(|cat| cat.get(symbol))
        .and_then(|i| i.currency.clone())
        .ok_or_else(|| SummaryError::UnknownCurrency {
            symbol: symbol.to_string(),
        })
}

fn product(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? * b?).filter(|v| v.is_finite())
}

/// Outer-join the fund with the exchange rate and convert.
///
/// `fx = None` means the fund already trades in the home currency (rate 1).
pub fn merge(fund: &PriceHistory, fx: Option<&PriceHistory>) -> Vec<SummaryRow> {
    let mut rows: BTreeMap<NaiveDate, SummaryRow> = BTreeMap::new();
    let blank = |date| SummaryRow {
        date,
        close: None,
        dividend: None,
        fx: None,
        close_home: None,
        dividend_home: None,
        dividend_rate: None,
    };
    for b in &fund.bars {
        let row = rows.entry(b.date).or_insert_with(|| blank(b.date));
        row.close = b.close;
        row.dividend = Some(b.dividend);
        if fx.is_none() {
            row.fx = Some(1.0);
        }
    }
    if let Some(fx) = fx {
        for b in &fx.bars {
            rows.entry(b.date).or_insert_with(|| blank(b.date)).fx = b.close;
        }
    }
    rows.into_values()
        .map(|mut r| {
            r.close_home = product(r.close, r.fx);
            r.dividend_home = product(r.dividend, r.fx);
            r.dividend_rate = match (r.dividend_home, r.close_home) {
                (Some(d), Some(c)) if c != 0.0 => Some(d / c),
                _ => None,
            };
            r
        })
        .collect()
}

/// Fetch `symbol` and its exchange rate into `home`, then merge.
///
/// `currency` is the fund's trading currency (see [`resolve_currency`]).
pub fn summarise<M: MarketData + ?Sized>(
    market: &M,
    symbol: &str,
    currency: &str,
    home: &str,
) -> Result<InstrumentSummary> {
    let currency = currency.to_ascii_uppercase();
    let home = home.to_ascii_uppercase();

    let fund = market.daily_history(symbol)?;
    if fund.bars.is_empty() {
        return Err(SummaryError::EmptyHistory {
            symbol: symbol.to_string(),
        }
        .into());
    }
    if let Some(reported) = fund.currency.as_deref()
        && !reported.eq_ignore_ascii_case(&currency)
    {
        warn!("{symbol} is quoted in {reported} but was summarised as {currency}");
    }

    let (fx_ticker, fx) = if currency == home {
        (None, None)
    } else {
        let t = fx_symbol(&currency, &home);
        let h = market.daily_history(&t)?;
        (Some(t), Some(h))
    };
    let rows = merge(&fund, fx.as_ref());
    info!("{symbol}: {} merged rows ({currency} → {home})", rows.len());

    Ok(InstrumentSummary {
        symbol: symbol.to_string(),
        currency,
        home,
        fx_symbol: fx_ticker,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_needs_both_sides() {
        assert_eq!(product(Some(2.0), Some(3.0)), Some(6.0));
        assert_eq!(product(None, Some(3.0)), None);
        assert_eq!(product(Some(2.0), None), None);
    }

    #[test]
    fn override_wins_and_is_uppercased() {
        assert_eq!(resolve_currency("X", Some(" usd "), None).unwrap(), "USD");
        assert_eq!(
            resolve_currency("X", Some(""), None),
            Err(SummaryError::UnknownCurrency { symbol: "X".into() })
        );
    }
}
