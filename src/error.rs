// =============================================================================
// Error taxonomy
// =============================================================================
//
// Three failure categories are kept apart so the caller can tell "could not
// reach the exchange" from "the exchange changed its response shape":
//
//   ConfigError  — credential / config file missing, malformed or incomplete.
//   NetworkError — the HTTP request could not be completed.
//   FormatError  — the response does not match the kline / ticker contract.
//
// Nothing in the library terminates the process; `main` decides.
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

/// Credential or configuration file problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} is missing required field '{field}'", path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// The request never produced a usable HTTP response.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not connect to {url}")]
    Connect { url: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl NetworkError {
    /// Classify a transport error the way reqwest reports it.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { url: url.to_string() }
        } else if err.is_connect() {
            Self::Connect { url: url.to_string() }
        } else {
            Self::Request {
                url: url.to_string(),
                source: err,
            }
        }
    }

    /// Timeouts and refused connections are worth one more attempt; anything
    /// the server actually answered is not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connect { .. })
    }
}

/// Errors raised by the indicator collaborator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{column}' has {actual} values, table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("column '{0}' already exists")]
    DuplicateColumn(String),
}

/// The exchange answered, but not in the shape we rely on.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{what} is not valid: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("response is missing field '{field}'")]
    MissingField { field: &'static str },

    #[error("kline {position} has {actual} fields, expected {expected}")]
    FieldCount {
        position: usize,
        expected: usize,
        actual: usize,
    },

    #[error("kline {position} has invalid {field}: {value}")]
    InvalidField {
        position: usize,
        field: &'static str,
        value: String,
    },

    #[error("kline {position} open time {millis} ms is out of range")]
    Timestamp { position: usize, millis: i64 },

    #[error("kline {position} open time {current} does not follow {previous}")]
    NonMonotonic {
        position: usize,
        previous: i64,
        current: i64,
    },

    #[error(transparent)]
    Indicators(#[from] IndicatorError),
}

/// Umbrella error for the whole fetch → format pipeline.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Format(#[from] FormatError),
}
