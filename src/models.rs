use crate::error::SelectionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Earliest year the dashboard lets a user select.
pub const MIN_YEAR: i32 = 1960;
/// Latest year the dashboard lets a user select.
pub const MAX_YEAR: i32 = 2023;

/// Inclusive year range used in observation queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    /// Validate and build a range. Both ends must lie in `MIN_YEAR..=MAX_YEAR`.
    pub fn new(start: i32, end: i32) -> Result<Self, SelectionError> {
        for y in [start, end] {
            if !(MIN_YEAR..=MAX_YEAR).contains(&y) {
                return Err(SelectionError::YearOutOfRange(y));
            }
        }
        if start > end {
            return Err(SelectionError::ReversedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The full supported span, which is what the dashboard starts with.
    pub fn full() -> Self {
        Self {
            start: MIN_YEAR,
            end: MAX_YEAR,
        }
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }

    /// Clamp a year into this range.
    pub fn clamp_year(&self, year: i32) -> i32 {
        year.clamp(self.start, self.end)
    }

    pub fn to_query_param(&self) -> String {
        format!("{}:{}", self.start, self.end)
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Parses `YYYY` (single year) or `YYYY:YYYY`.
impl FromStr for YearRange {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || SelectionError::BadYearSpec(s.to_string());
        if let Some((a, b)) = s.split_once(':') {
            let start = a.trim().parse::<i32>().map_err(|_| bad())?;
            let end = b.trim().parse::<i32>().map_err(|_| bad())?;
            Self::new(start, end)
        } else {
            let y = s.trim().parse::<i32>().map_err(|_| bad())?;
            Self::new(y, y)
        }
    }
}

/// Metadata section returned by the API (position 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub page: u32,
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub pages: u32,
    /// Some endpoints encode `per_page` as a string, others as a number.
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub per_page: u32,
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub total: u32,
}

/// Serde helper: parse `u32` from either a JSON number or a string.
fn de_u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct U32Visitor;

    impl<'de> Visitor<'de> for U32Visitor {
        type Value = u32;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer representing a non-negative number")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(v).map_err(E::custom)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(v).map_err(|_| E::custom("negative value for u32"))
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.trim().parse::<u32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U32Visitor)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeName {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub value: String,
}

/// Raw entry of the indicator catalog (`/indicator`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorRecord {
    pub id: String,
    #[serde(alias = "value")]
    pub name: String,
    #[serde(default)]
    pub source: Option<CodeName>,
}

/// Raw entry of the country/region catalog (`/country`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryRecord {
    pub id: String,
    #[serde(rename = "iso2Code", default)]
    pub iso2_code: String,
    pub name: String,
    #[serde(default)]
    pub region: Option<CodeName>,
}

/// Raw observation entry (`/country/{codes}/indicator/{code}`, position 1 array).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub indicator: CodeName,
    pub country: CodeName,
    #[serde(default)]
    pub countryiso3code: String,
    pub date: String,
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(rename = "obs_status", default)]
    pub obs_status: Option<String>,
    #[serde(default)]
    pub decimal: Option<i32>,
}

/// A named statistical series, e.g. `NY.GDP.MKTP.CD` / "GDP (current US$)".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Indicator {
    pub code: String,
    pub name: String,
}

impl From<IndicatorRecord> for Indicator {
    fn from(r: IndicatorRecord) -> Self {
        Self {
            code: r.id,
            name: r.name,
        }
    }
}

/// A country or an aggregate region. Both share this shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub code: String,
    pub name: String,
}

impl From<CountryRecord> for Location {
    fn from(r: CountryRecord) -> Self {
        Self {
            code: r.id,
            name: r.name,
        }
    }
}

/// One data point: an indicator value for a country in a year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Display name, e.g. "France".
    pub country: String,
    /// API country id (ISO2 for countries, e.g. "FR").
    pub country_id: String,
    pub year: i32,
    pub value: Option<f64>,
    pub iso3: Option<String>,
}

impl Observation {
    /// Normalize a raw API entry. Entries whose date is not a plain year are dropped.
    pub fn from_entry(e: Entry) -> Option<Self> {
        let year = e.date.trim().parse::<i32>().ok()?;
        let iso3 = Some(e.countryiso3code.trim().to_string()).filter(|s| !s.is_empty());
        Some(Self {
            country: e.country.value,
            country_id: e.country.id,
            year,
            value: e.value,
            iso3,
        })
    }

    /// Whether this row belongs to `code`, matching ISO3 first then the API id.
    pub fn matches_code(&self, code: &str) -> bool {
        self.iso3
            .as_deref()
            .is_some_and(|iso3| iso3.eq_ignore_ascii_case(code))
            || self.country_id.eq_ignore_ascii_case(code)
    }
}

/// Outcome of asking the API whether a code names a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Not a region: the code stands for itself.
    Standalone { code: String },
    /// A region with its member countries.
    Region { code: String, members: Vec<Location> },
}
