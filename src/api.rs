/// Synchronous client for the **Eurostat dissemination API** (statistics 1.0, JSON-stat).
///
/// A query is a dataset code plus a set of dimension filters; the response cube
/// is flattened into a [`RawTable`](crate::models::RawTable) with the same layout
/// as Eurostat's TSV bulk files (dimension columns, then one column per period).
///
/// ### Notes
/// - Exactly one request per call. No retry, no caching.
/// - Network timeouts use a sane default (30s) and can be adjusted by editing the client builder.
/// - An empty filter value list (e.g. no resolved countries) omits that dimension
///   from the query; what comes back is up to Eurostat.
///
/// Typical usage:
/// ```no_run
/// # use eurostat_macro::api::{DataSource, EurostatClient};
/// let client = EurostatClient::default();
/// let raw = client.get_data(
///     "prc_hicp_manr",
///     &[("coicop".into(), vec!["CP00".into()]), ("geo".into(), vec!["PL".into()])],
/// )?;
/// # Ok::<(), anyhow::Error>(())
/// ```
use crate::error::ApiError;
use crate::jsonstat::JsonStat;
use crate::models::RawTable;
use anyhow::{Context, Result};
use log::{debug, info};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;

/// A tabular statistical data source.
///
/// `filters` maps a dimension name to the list of accepted values. Row 0 of
/// the logical response is the header; see [`RawTable`].
pub trait DataSource {
    fn get_data(&self, dataset: &str, filters: &[(String, Vec<String>)]) -> Result<RawTable>;
}

impl<T: DataSource + ?Sized> DataSource for &T {
    fn get_data(&self, dataset: &str, filters: &[(String, Vec<String>)]) -> Result<RawTable> {
        (**self).get_data(dataset, filters)
    }
}

#[derive(Debug, Clone)]
pub struct EurostatClient {
    pub base_url: String,
    http: HttpClient,
}

pub const DEFAULT_BASE_URL: &str = "https://ec.europa.eu/eurostat/api/dissemination";

impl Default for EurostatClient {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

// Allow -, _, . unescaped in codes (common for dataset and category ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s.trim(), SAFE).to_string()
}

pub(crate) fn http_client() -> HttpClient {
    HttpClient::builder()
        .timeout(Duration::from_secs(30)) // total request timeout
        .connect_timeout(Duration::from_secs(10)) // connect timeout
        .redirect(Policy::limited(5)) // cap redirects
        .user_agent(concat!("eurostat_macro/", env!("CARGO_PKG_VERSION"))) // set user agent
        .build()
        .expect("reqwest client build")
}

impl EurostatClient {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: http_client(),
        }
    }

    /// Build the request URL for a dataset and its filters.
    ///
    /// ```
    /// # use eurostat_macro::api::EurostatClient;
    /// let c = EurostatClient::with_base_url("http://x");
    /// let url = c.data_url("irt_st_m", &[("int_rt".into(), vec!["IRT_M3".into()])]);
    /// assert_eq!(url, "http://x/statistics/1.0/data/irt_st_m?format=JSON&lang=EN&int_rt=IRT_M3");
    /// ```
    pub fn data_url(&self, dataset: &str, filters: &[(String, Vec<String>)]) -> String {
        let mut url = format!(
            "{}/statistics/1.0/data/{}?format=JSON&lang=EN",
            self.base_url,
            enc(dataset)
        );
        for (dim, values) in filters {
            for v in values {
                url.push_str(&format!("&{}={}", enc(dim), enc(v)));
            }
        }
        url
    }
}

/// Surface an error payload in a Eurostat response, if there is one.
///
/// Eurostat has used both `{"error": {...}}` and `{"error": [{...}]}`.
pub fn eurostat_error(v: &Value, http_status: u16) -> Option<ApiError> {
    let err = v.get("error")?;
    let err = match err {
        Value::Array(items) => items.first()?,
        other => other,
    };
    let status = err
        .get("status")
        .and_then(Value::as_u64)
        .map(|s| s as u16)
        .unwrap_or(http_status);
    let label = err
        .get("label")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    Some(ApiError::Eurostat { status, label })
}

/// Decode a Eurostat JSON body into a [`RawTable`].
pub fn parse_response(v: Value, http_status: u16) -> Result<RawTable> {
    if let Some(e) = eurostat_error(&v, http_status) {
        return Err(e.into());
    }
    let cube: JsonStat = serde_json::from_value(v).context("parse json-stat dataset")?;
    Ok(cube.to_raw_table()?)
}

impl DataSource for EurostatClient {
    /// Fetch one dataset.
    ///
    /// ### Errors
    /// - Network/HTTP error
    /// - JSON decoding error
    /// - Eurostat error payload (surfaced as [`ApiError::Eurostat`])
    fn get_data(&self, dataset: &str, filters: &[(String, Vec<String>)]) -> Result<RawTable> {
        let url = self.data_url(dataset, filters);
        info!("GET {url}");
        let resp = self
            .http
            .get(&url)
            .send()
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status();
        let body: Value = match resp.json() {
            Ok(v) => v,
            Err(e) if !status.is_success() => {
                return Err(ApiError::Eurostat {
                    status: status.as_u16(),
                    label: e.to_string(),
                }
                .into());
            }
            Err(e) => return Err(e).with_context(|| format!("decode json from {url}")),
        };
        let raw = parse_response(body, status.as_u16()).with_context(|| format!("GET {url}"))?;
        debug!("{dataset}: {} rows, {} columns", raw.rows.len(), raw.header.len());
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_repeats_dimension_per_value() {
        let c = EurostatClient::with_base_url("http://h/");
        let url = c.data_url(
            "une_rt_m",
            &[
                ("sex".into(), vec!["T".into()]),
                ("geo".into(), vec!["PL".into(), "DE".into()]),
            ],
        );
        assert!(url.starts_with("http://h/statistics/1.0/data/une_rt_m?"));
        assert!(url.ends_with("&sex=T&geo=PL&geo=DE"));
    }

    #[test]
    fn empty_geo_filter_is_omitted() {
        let c = EurostatClient::with_base_url("http://h");
        let url = c.data_url("prc_hicp_manr", &[("geo".into(), vec![])]);
        assert!(!url.contains("geo="));
    }

    #[test]
    fn error_payload_both_shapes() {
        let a: Value = serde_json::json!({"error": {"status": 404, "label": "No data"}});
        let b: Value = serde_json::json!({"error": [{"status": 400, "id": 100, "label": "bad"}]});
        match eurostat_error(&a, 200) {
            Some(ApiError::Eurostat { status, label }) => {
                assert_eq!(status, 404);
                assert_eq!(label, "No data");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            eurostat_error(&b, 200),
            Some(ApiError::Eurostat { status: 400, .. })
        ));
        assert!(eurostat_error(&serde_json::json!({"id": []}), 200).is_none());
    }
}
