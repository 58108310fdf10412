//! Synchronous client for the **World Bank Indicators API (v2)**.
//!
//! Covers the four lookups the dashboard needs: the indicator catalog, the
//! country/region catalog, region membership, and observations for
//! `country/{codes}/indicator/{code}`. Every list request pages until the API
//! reports the last page.
//!
//! ### Notes
//! - The API sometimes serializes `per_page` as a **string**; we accept both string/number.
//! - A `[{"message": ...}]` envelope is how the API says "invalid parameter". On the
//!   region endpoint that means "not a region"; everywhere else it is an error.
//! - An observation response may carry `null` instead of a data array when no
//!   values exist. That is an empty result, not an error.
//!
//! Typical usage:
//! ```no_run
//! # use wbi_dash::{Client, ClientConfig, YearRange};
//! let client = Client::new(ClientConfig::default())?;
//! let rows = client.fetch_observations(
//!     "NY.GDP.MKTP.CD",
//!     &["FRA".to_string()],
//!     YearRange::new(2015, 2020)?,
//! )?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::expand::Resolver;
use crate::models::{
    CountryRecord, Entry, IndicatorRecord, Location, Meta, Observation, Resolution, YearRange,
};
use log::debug;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Something that can GET a URL and hand back decoded JSON.
///
/// The HTTP implementation is [`HttpTransport`]; tests plug in canned responses.
pub trait Transport {
    fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        (**self).get_json(url)
    }
}

/// Blocking `reqwest` transport with timeouts and a small retry for 5xx/network errors.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let http = HttpClient::builder()
            .timeout(config.timeout) // total request timeout
            .connect_timeout(config.connect_timeout)
            .redirect(Policy::limited(5))
            .user_agent(concat!("wbi_dash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let mut last_err: Option<FetchError> = None;
        for backoff_ms in [100u64, 300, 700] {
            match self.http.get(url).send() {
                Ok(r) if r.status().is_success() => {
                    let body = r.text().map_err(|e| FetchError::Network {
                        url: url.to_string(),
                        message: e.to_string(),
                    })?;
                    return serde_json::from_str(&body)
                        .map_err(|e| FetchError::decode("json body", e));
                }
                Ok(r) if r.status().is_server_error() => {
                    last_err = Some(FetchError::Status {
                        url: url.to_string(),
                        status: r.status().as_u16(),
                    });
                }
                Ok(r) => {
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status: r.status().as_u16(),
                    });
                }
                // Timeouts land here too and are retried like any other transport error.
                Err(e) => {
                    last_err = Some(FetchError::Network {
                        url: url.to_string(),
                        message: e.to_string(),
                    });
                }
            }
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }
        Err(last_err.unwrap_or_else(|| FetchError::Network {
            url: url.to_string(),
            message: "no attempt made".into(),
        }))
    }
}

// Allow -, _, . unescaped in codes (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s.trim(), SAFE).to_string()
}

fn enc_join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts.into_iter().map(enc).collect::<Vec<_>>().join(";")
}

/// One decoded response: either a page of data or an API message.
#[derive(Debug)]
enum Envelope {
    Message(Value),
    Page { meta: Option<Meta>, data: Value },
}

fn split_envelope(v: Value) -> Result<Envelope, FetchError> {
    let Value::Array(mut arr) = v else {
        return Err(FetchError::Shape("not a top-level array".into()));
    };
    if arr.is_empty() {
        return Err(FetchError::Shape("empty array".into()));
    }
    if let Some(msg) = arr[0].get("message") {
        return Ok(Envelope::Message(msg.clone()));
    }
    let data = if arr.len() > 1 { arr.swap_remove(1) } else { Value::Null };
    let meta = match arr.swap_remove(0) {
        Value::Null => None,
        m => Some(serde_json::from_value(m).map_err(|e| FetchError::decode("meta", e))?),
    };
    Ok(Envelope::Page { meta, data })
}

/// Rows from every page, or the message the API answered with instead.
#[derive(Debug)]
enum Paged<R> {
    Rows(Vec<R>),
    Message(Value),
}

#[derive(Debug, Clone)]
pub struct Client<T = HttpTransport> {
    pub base_url: String,
    per_page: u32,
    max_pages: u32,
    transport: T,
}

impl Client<HttpTransport> {
    /// Build a client backed by a real HTTP transport.
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            per_page: config.per_page.max(1),
            max_pages: config.max_pages.max(1),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Full indicator catalog, unfiltered.
    pub fn fetch_indicators(&self) -> Result<Vec<IndicatorRecord>, FetchError> {
        let url = format!("{}/indicator?format=json&per_page={}", self.base_url, self.per_page);
        self.fetch_list(&url, "indicators")
    }

    /// Full country/region catalog, unfiltered.
    pub fn fetch_locations(&self) -> Result<Vec<CountryRecord>, FetchError> {
        let url = format!("{}/country?format=json&per_page={}", self.base_url, self.per_page);
        self.fetch_list(&url, "countries")
    }

    /// Ask whether `code` is a region and, if so, which countries belong to it.
    pub fn resolve_location(&self, code: &str) -> Result<Resolution, FetchError> {
        let code = code.trim().to_string();
        let url = format!(
            "{}/country?region={}&format=json&per_page={}",
            self.base_url,
            enc(&code),
            self.per_page
        );
        match self.collect_pages::<CountryRecord>(&url, "region members")? {
            Paged::Message(_) => Ok(Resolution::Standalone { code }),
            Paged::Rows(rows) if rows.is_empty() => Ok(Resolution::Standalone { code }),
            Paged::Rows(rows) => Ok(Resolution::Region {
                code,
                members: rows.into_iter().map(Location::from).collect(),
            }),
        }
    }

    /// Fetch observations of one indicator for the given country/region codes.
    ///
    /// Returns an empty vector when the API has no data for the query.
    pub fn fetch_observations(
        &self,
        indicator: &str,
        codes: &[String],
        range: YearRange,
    ) -> Result<Vec<Observation>, FetchError> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!(
            "{}/country/{}/indicator/{}?date={}&format=json&per_page={}",
            self.base_url,
            enc_join(codes.iter().map(|s| s.as_str())),
            enc(indicator),
            range.to_query_param(),
            self.per_page
        );
        let entries: Vec<Entry> = self.fetch_list(&url, "observations")?;
        let total = entries.len();
        let out: Vec<Observation> = entries.into_iter().filter_map(Observation::from_entry).collect();
        if out.len() < total {
            debug!("dropped {} entries without a plain year", total - out.len());
        }
        Ok(out)
    }

    fn fetch_list<R: DeserializeOwned>(
        &self,
        url: &str,
        what: &'static str,
    ) -> Result<Vec<R>, FetchError> {
        match self.collect_pages(url, what)? {
            Paged::Rows(rows) => Ok(rows),
            Paged::Message(msg) => Err(FetchError::Api(msg.to_string())),
        }
    }

    /// Paginate until we retrieved all pages.
    fn collect_pages<R: DeserializeOwned>(
        &self,
        url: &str,
        what: &'static str,
    ) -> Result<Paged<R>, FetchError> {
        let mut page = 1u32;
        let mut out: Vec<R> = Vec::new();
        loop {
            if page > self.max_pages {
                return Err(FetchError::PageLimit(self.max_pages));
            }
            let page_url = format!("{}&page={}", url, page);
            debug!("GET {}", page_url);
            let v = self.transport.get_json(&page_url)?;

            let (meta, data) = match split_envelope(v)? {
                Envelope::Message(msg) if page == 1 => return Ok(Paged::Message(msg)),
                Envelope::Message(msg) => return Err(FetchError::Api(msg.to_string())),
                Envelope::Page { meta, data } => (meta, data),
            };
            match data {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items {
                        out.push(serde_json::from_value(item).map_err(|e| FetchError::decode(what, e))?);
                    }
                }
                other => {
                    return Err(FetchError::Shape(format!(
                        "{what}: expected an array, got {}",
                        json_kind(&other)
                    )));
                }
            }

            let total_pages = meta.map(|m| m.pages).unwrap_or(1);
            if page >= total_pages {
                break;
            }
            page += 1;
        }
        Ok(Paged::Rows(out))
    }
}

impl<T: Transport> Resolver for Client<T> {
    fn resolve(&self, code: &str) -> Result<Resolution, FetchError> {
        self.resolve_location(code)
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
