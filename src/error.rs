//! Error types shared by the client, the caches and the dashboard pipeline.

use thiserror::Error;

/// Failure talking to the World Bank API or decoding what it sent back.
///
/// None of these are fatal to a dashboard run: the pipeline turns them into
/// warnings and carries on with empty data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("world bank api error: {0}")]
    Api(String),

    #[error("unexpected response shape: {0}")]
    Shape(String),

    #[error("page limit exceeded ({0})")]
    PageLimit(u32),

    #[error("http client setup failed: {0}")]
    Client(String),
}

impl FetchError {
    pub(crate) fn decode(what: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { what, source }
    }
}

/// A user selection that cannot be turned into a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("year range {start}:{end} is reversed")]
    ReversedRange { start: i32, end: i32 },

    #[error("year {0} is outside the supported range {min}..={max}", min = crate::models::MIN_YEAR, max = crate::models::MAX_YEAR)]
    YearOutOfRange(i32),

    #[error("invalid year spec '{0}', expected YYYY or YYYY:YYYY")]
    BadYearSpec(String),

    #[error("unknown indicator code '{0}'")]
    UnknownIndicator(String),

    #[error("malformed code '{0}'")]
    MalformedCode(String),
}
