//! Flat observations → wide year×country table → long table ready for charting.
//!
//! The wide step fills every (year, country) pair of the union with a missing
//! marker, so every series has a point for every year and a gap shows up as a
//! gap rather than as a line jumping across it.

use crate::format::NumberFormat;
use crate::models::{Observation, YearRange};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// One (year, country) cell of the long table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRow {
    pub year: i32,
    pub country: String,
    pub value: Option<f64>,
    pub formatted: String,
}

/// Year-indexed table with one column per country.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideTable {
    countries: BTreeSet<String>,
    cells: BTreeMap<i32, BTreeMap<String, Option<f64>>>,
}

impl WideTable {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.cells.keys().copied()
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.countries.iter().map(String::as_str)
    }

    /// `None` if the pair is outside the table, `Some(None)` if the cell is missing.
    pub fn get(&self, year: i32, country: &str) -> Option<Option<f64>> {
        self.cells.get(&year)?.get(country).copied()
    }

    /// Add empty rows for every year of `range` not yet present.
    /// Does nothing on an empty table: no countries means no series to pad.
    pub fn pad_years(&mut self, range: YearRange) {
        if self.countries.is_empty() {
            return;
        }
        for year in range.years() {
            let row = self.cells.entry(year).or_default();
            for c in &self.countries {
                row.entry(c.clone()).or_insert(None);
            }
        }
    }

    /// Re-flatten into long form, ordered by (year, country).
    pub fn melt(&self, fmt: &NumberFormat) -> SeriesTable {
        let rows = self
            .cells
            .iter()
            .flat_map(|(&year, row)| {
                row.iter().map(move |(country, &value)| LongRow {
                    year,
                    country: country.clone(),
                    value,
                    formatted: fmt.format_opt(value),
                })
            })
            .collect();
        SeriesTable { rows }
    }
}

/// Orders duplicates so the last one inserted is the greatest value.
pub(crate) fn cmp_value(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.total_cmp(&y),
    }
}

/// Pivot rows into a [`WideTable`].
///
/// Rows are first sorted by (country, year, value) and then inserted in that
/// order, last write wins. For duplicate (country, year) pairs the greatest
/// value is kept and a present value beats a missing one, whatever the input order.
pub fn widen(rows: &[Observation]) -> WideTable {
    let mut sorted: Vec<&Observation> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        a.country
            .cmp(&b.country)
            .then(a.year.cmp(&b.year))
            .then_with(|| cmp_value(a.value, b.value))
    });

    let countries: BTreeSet<String> = sorted.iter().map(|o| o.country.clone()).collect();
    let mut cells: BTreeMap<i32, BTreeMap<String, Option<f64>>> = BTreeMap::new();
    for o in &sorted {
        cells.entry(o.year).or_default().insert(o.country.clone(), o.value);
    }
    for row in cells.values_mut() {
        for c in &countries {
            row.entry(c.clone()).or_insert(None);
        }
    }
    WideTable { countries, cells }
}

/// Widen and melt over the years actually observed.
pub fn reshape(rows: &[Observation], fmt: &NumberFormat) -> SeriesTable {
    widen(rows).melt(fmt)
}

/// Like [`reshape`], but every year of `range` gets a row for every country.
pub fn reshape_over(rows: &[Observation], range: YearRange, fmt: &NumberFormat) -> SeriesTable {
    let mut wide = widen(rows);
    wide.pad_years(range);
    wide.melt(fmt)
}

/// Long-form table: one row per (year, country).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesTable {
    pub rows: Vec<LongRow>,
}

impl SeriesTable {
    /// An empty table means "no data available": callers skip chart rendering.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn countries(&self) -> BTreeSet<&str> {
        self.rows.iter().map(|r| r.country.as_str()).collect()
    }

    pub fn years(&self) -> BTreeSet<i32> {
        self.rows.iter().map(|r| r.year).collect()
    }

    /// Rows of one country, in year order.
    pub fn series(&self, country: &str) -> Vec<&LongRow> {
        self.rows.iter().filter(|r| r.country == country).collect()
    }

    /// Rows of one year sorted by value, largest first, missing values last.
    pub fn for_year(&self, year: i32) -> Vec<LongRow> {
        let mut out: Vec<LongRow> = self.rows.iter().filter(|r| r.year == year).cloned().collect();
        out.sort_by(|a, b| cmp_value(b.value, a.value).then_with(|| a.country.cmp(&b.country)));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(country: &str, year: i32, value: Option<f64>) -> Observation {
        Observation {
            country: country.into(),
            country_id: String::new(),
            year,
            value,
            iso3: None,
        }
    }

    #[test]
    fn bar_order_puts_missing_last() {
        let rows = vec![
            obs("A", 2000, Some(1.0)),
            obs("B", 2000, None),
            obs("C", 2000, Some(5.0)),
        ];
        let t = reshape(&rows, &NumberFormat::default());
        let rows = t.for_year(2000);
        let bars: Vec<&str> = rows.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(bars, ["C", "A", "B"]);
    }

    #[test]
    fn padding_an_empty_table_keeps_it_empty() {
        let mut w = widen(&[]);
        w.pad_years(YearRange::new(2000, 2005).unwrap());
        assert!(w.is_empty());
    }
}
