//! Per-year rows and colouring for the choropleth map.
//!
//! Missing values are stored as [`MISSING_SENTINEL`]. The colour range is
//! computed over strictly positive values only, and anything non-positive
//! lands in a separate "no data" bucket instead of being stretched into the
//! data scale.

use crate::format::NumberFormat;
use crate::models::Observation;
use crate::reshape::cmp_value;
use log::debug;
use serde::{Deserialize, Serialize};

/// Stand-in value for a country with no data in the chosen year.
pub const MISSING_SENTINEL: f64 = -1.0;

/// Colour of the "no data" bucket.
pub const NO_DATA_COLOR: &str = "#404040";

/// Viridis stops used for real data, positions in `0..=1`.
pub const DATA_STOPS: [(f64, &str); 5] = [
    (0.0, "#440154"),
    (0.25, "#3b528b"),
    (0.5, "#21918c"),
    (0.75, "#5ec962"),
    (1.0, "#fde725"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRow {
    pub country: String,
    /// Reported value, or [`MISSING_SENTINEL`].
    pub value: f64,
    pub formatted: String,
    pub iso3: String,
}

impl MapRow {
    pub fn has_data(&self) -> bool {
        self.value > 0.0
    }
}

/// Where a value falls on the map scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bucket {
    NoData,
    /// Position within the colour range, clamped to `0..=1`.
    Data(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRange {
    pub min: f64,
    pub max: f64,
}

impl ColorRange {
    /// Min/max over strictly positive values; `(0, 1)` if there are none.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite() && *v > 0.0)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min.is_finite() {
            Self { min, max }
        } else {
            Self { min: 0.0, max: 1.0 }
        }
    }

    pub fn bucket(&self, value: f64) -> Bucket {
        if !value.is_finite() || value <= 0.0 {
            return Bucket::NoData;
        }
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            return Bucket::Data(1.0);
        }
        Bucket::Data(((value - self.min) / span).clamp(0.0, 1.0))
    }

    /// Hex colour for `value`.
    pub fn color_for(&self, value: f64) -> String {
        match self.bucket(value) {
            Bucket::NoData => NO_DATA_COLOR.to_string(),
            Bucket::Data(t) => interpolate(t),
        }
    }
}

fn parse_hex(hex: &str) -> (u8, u8, u8) {
    let h = hex.trim_start_matches('#');
    let c = |i: usize| u8::from_str_radix(&h[i..i + 2], 16).unwrap_or(0);
    (c(0), c(2), c(4))
}

fn interpolate(t: f64) -> String {
    let t = t.clamp(0.0, 1.0);
    let upper = DATA_STOPS
        .iter()
        .position(|&(pos, _)| pos >= t)
        .unwrap_or(DATA_STOPS.len() - 1)
        .max(1);
    let (p0, c0) = DATA_STOPS[upper - 1];
    let (p1, c1) = DATA_STOPS[upper];
    let f = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };
    let (r0, g0, b0) = parse_hex(c0);
    let (r1, g1, b1) = parse_hex(c1);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
    format!("#{:02x}{:02x}{:02x}", mix(r0, r1), mix(g0, g1), mix(b0, b1))
}

/// Map rows and colour range for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFrame {
    pub year: i32,
    pub rows: Vec<MapRow>,
    pub range: ColorRange,
}

impl MapFrame {
    /// Build the frame for `year`. Rows without an ISO3 code cannot be placed
    /// on the map and are skipped.
    pub fn for_year(observations: &[Observation], year: i32, fmt: &NumberFormat) -> Self {
        let mut placed: Vec<(&str, &Observation)> = observations
            .iter()
            .filter(|o| o.year == year)
            .filter_map(|o| match o.iso3.as_deref() {
                Some(iso3) => Some((iso3, o)),
                None => {
                    debug!("no iso3 code for {}, left off the map", o.country);
                    None
                }
            })
            .collect();
        // Greatest value first within each iso3, so dedup keeps it.
        placed.sort_by(|(a, oa), (b, ob)| a.cmp(b).then_with(|| cmp_value(ob.value, oa.value)));
        placed.dedup_by(|a, b| a.0 == b.0);
        let rows: Vec<MapRow> = placed
            .into_iter()
            .map(|(iso3, o)| MapRow {
                country: o.country.clone(),
                value: o.value.unwrap_or(MISSING_SENTINEL),
                formatted: fmt.format_opt(o.value),
                iso3: iso3.to_string(),
            })
            .collect();
        let range = ColorRange::from_values(rows.iter().map(|r| r.value));
        Self { year, rows, range }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn data_rows(&self) -> impl Iterator<Item = &MapRow> {
        self.rows.iter().filter(|r| r.has_data())
    }

    pub fn no_data_rows(&self) -> impl Iterator<Item = &MapRow> {
        self.rows.iter().filter(|r| !r.has_data())
    }
}
