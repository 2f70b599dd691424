//! Live API tests. Run with: `cargo test --features online -- --nocapture`
#![cfg(feature = "online")]

use chrono::NaiveDate;
use eurostat_macro::fetch::{Query, get_hicp, get_rates};
use eurostat_macro::market::MarketData;
use eurostat_macro::{EurostatClient, Tenor, YahooClient};

#[test]
fn hicp_for_two_countries() {
    let client = EurostatClient::default();
    let q = Query::since("2021-01-01")
        .unwrap()
        .until("2021-12-31")
        .unwrap()
        .countries(["Poland", "Germany"]);
    let t = get_hicp(&client, &q).unwrap();
    assert_eq!(t.columns, vec!["PL_hicp", "DE_hicp"]);
    assert_eq!(t.len(), 12);
    assert_eq!(t.dates[0], NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
}

#[test]
fn euro_area_rates() {
    let client = EurostatClient::default();
    let q = Query::since("2020-01-01")
        .unwrap()
        .until("2020-06-30")
        .unwrap()
        .countries(["Euro Zone"]);
    let t = get_rates(&client, &q, Tenor::ThreeMonth).unwrap();
    assert_eq!(t.columns, vec!["EA_M3_rate"]);
    assert!(!t.is_empty());
}

#[test]
fn yahoo_daily_history() {
    let h = YahooClient::default().daily_history("EURPLN=X").unwrap();
    assert!(h.bars.len() > 100);
    assert!(h.bars.windows(2).all(|w| w[0].date < w[1].date));
}
