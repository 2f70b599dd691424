use thiserror::Error;

/// Failures reported by a remote data service in a form callers may match on.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("eurostat api error (status {status}): {label}")]
    Eurostat { status: u16, label: String },
    #[error("market data error for {symbol}: {description}")]
    Market { symbol: String, description: String },
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

/// Failures of the instrument summary that require caller input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummaryError {
    /// The instrument is not in the catalog and no currency was supplied.
    #[error("no currency known for {symbol}; pass it explicitly (e.g. --currency EUR)")]
    UnknownCurrency { symbol: String },
    #[error("no price history returned for {symbol}")]
    EmptyHistory { symbol: String },
}
