//! Canned World Bank responses for offline tests.
#![allow(dead_code)]

use serde_json::{Value, json};
use std::sync::Mutex;
use wbi_dash::{Client, ClientConfig, FetchError, Transport};

pub enum Reply {
    Json(Value),
    Status(u16),
}

/// Serves the first route whose fragment occurs in the URL; records every URL.
/// Unmatched URLs answer HTTP 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: Vec<(String, Reply)>,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, fragment: &str, body: Value) -> Self {
        self.routes.push((fragment.to_string(), Reply::Json(body)));
        self
    }

    pub fn fail(mut self, fragment: &str, status: u16) -> Self {
        self.routes.push((fragment.to_string(), Reply::Status(status)));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_matching(&self, fragment: &str) -> usize {
        self.calls().iter().filter(|u| u.contains(fragment)).count()
    }
}

impl Transport for FakeTransport {
    fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let reply = self.routes.iter().find(|(frag, _)| url.contains(frag.as_str()));
        match reply {
            Some((_, Reply::Json(v))) => Ok(v.clone()),
            Some((_, Reply::Status(status))) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

pub fn client(transport: FakeTransport) -> Client<FakeTransport> {
    Client::with_transport(ClientConfig::default(), transport)
}

/// `[meta, data]` envelope with a single page.
pub fn page(data: Value) -> Value {
    let total = data.as_array().map_or(0, |a| a.len());
    json!([{"page": 1, "pages": 1, "per_page": "20000", "total": total}, data])
}

/// The API's "invalid parameter" answer, used for non-region codes.
pub fn message() -> Value {
    json!([{"message": [{"id": "120", "key": "Invalid value", "value": "The provided parameter value is not valid"}]}])
}

pub fn country(id: &str, name: &str) -> Value {
    json!({"id": id, "iso2Code": "", "name": name, "region": {"id": "", "value": ""}})
}

pub fn entry(name: &str, iso3: &str, year: i32, value: Option<f64>) -> Value {
    json!({
        "indicator": {"id": "NY.GDP.MKTP.CD", "value": "GDP (current US$)"},
        "country": {"id": &iso3[..2], "value": name},
        "countryiso3code": iso3,
        "date": year.to_string(),
        "value": value,
        "unit": "",
        "obs_status": "",
        "decimal": 0
    })
}

pub fn indicator_catalog() -> Value {
    page(json!([
        {"id": "NY.GDP.MKTP.CD", "name": "GDP (current US$)", "source": {"id": "2", "value": "World Development Indicators"}},
        {"id": "SP.POP.TOTL", "name": "Population, total", "source": {"id": "2", "value": "World Development Indicators"}},
        {"id": "GDP.OTHER", "name": "GDP from another source", "source": {"id": "57", "value": "Other"}}
    ]))
}

pub fn location_catalog() -> Value {
    page(json!([
        country("FRA", "France"),
        country("DEU", "Germany"),
        country("NOR", "Norway"),
        country("USA", "United States"),
        country("EUU", "European Union"),
        country("ECS", "Europe & Central Asia"),
        country("HIC", "High income"),
        country("NA", "Not classified")
    ]))
}

/// Catalogs plus two overlapping regions: EUU = {FRA, DEU}, ECS = {FRA, DEU, NOR}.
/// Any other region lookup answers with the "invalid value" message.
pub fn world() -> FakeTransport {
    FakeTransport::new()
        .route("/indicator?format=json", indicator_catalog())
        .route("/country?format=json", location_catalog())
        .route(
            "/country?region=EUU&",
            page(json!([country("FRA", "France"), country("DEU", "Germany")])),
        )
        .route(
            "/country?region=ECS&",
            page(json!([
                country("FRA", "France"),
                country("DEU", "Germany"),
                country("NOR", "Norway")
            ])),
        )
        .route("/country?region=", message())
}
