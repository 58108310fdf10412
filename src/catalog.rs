//! Normalizing and querying the reference lists (indicators and locations).

use crate::config::DashboardConfig;
use crate::models::{CountryRecord, Indicator, IndicatorRecord, Location};
use ahash::AHashSet;

/// Indicator preselected when the user has not chosen one.
pub const DEFAULT_INDICATOR_NAME: &str = "GDP (current US$)";

/// Keep only indicators from the canonical source, first occurrence of each code.
pub fn normalize_indicators(records: Vec<IndicatorRecord>, canonical_source: &str) -> Vec<Indicator> {
    let mut seen = AHashSet::new();
    records
        .into_iter()
        .filter(|r| r.source.as_ref().is_some_and(|s| s.id == canonical_source))
        .map(Indicator::from)
        .filter(|i| seen.insert(i.code.clone()))
        .collect()
}

/// Drop excluded aggregate codes, first occurrence of each code.
pub fn normalize_locations(records: Vec<CountryRecord>, excluded: &[String]) -> Vec<Location> {
    let mut seen = AHashSet::new();
    records
        .into_iter()
        .map(Location::from)
        .filter(|l| !excluded.iter().any(|x| x.eq_ignore_ascii_case(&l.code)))
        .filter(|l| seen.insert(l.code.clone()))
        .collect()
}

/// Borrowed view over the cached reference lists.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    pub indicators: &'a [Indicator],
    pub locations: &'a [Location],
}

impl<'a> Catalog<'a> {
    pub fn new(indicators: &'a [Indicator], locations: &'a [Location]) -> Self {
        Self {
            indicators,
            locations,
        }
    }

    /// Case-insensitive literal substring match on the indicator name.
    pub fn search_indicators(&self, query: &str) -> Vec<&'a Indicator> {
        let needle = query.trim().to_lowercase();
        self.indicators
            .iter()
            .filter(|i| i.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// "GDP (current US$)" if it is among `matches`, else the first match.
    pub fn default_indicator(matches: &[&'a Indicator]) -> Option<&'a Indicator> {
        matches
            .iter()
            .find(|i| i.name == DEFAULT_INDICATOR_NAME)
            .or_else(|| matches.first())
            .copied()
    }

    pub fn indicator(&self, code: &str) -> Option<&'a Indicator> {
        self.indicators.iter().find(|i| i.code.eq_ignore_ascii_case(code))
    }

    pub fn location(&self, code: &str) -> Option<&'a Location> {
        self.locations.iter().find(|l| l.code.eq_ignore_ascii_case(code))
    }

    pub fn search_locations(&self, query: &str) -> Vec<&'a Location> {
        let needle = query.trim().to_lowercase();
        self.locations
            .iter()
            .filter(|l| l.name.to_lowercase().contains(&needle) || l.code.to_lowercase() == needle)
            .collect()
    }

    /// Translate display names (as picked in a multiselect) into location codes.
    /// Unknown names are skipped.
    pub fn codes_for_names<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        self.locations
            .iter()
            .filter(|l| names.iter().any(|n| n.as_ref() == l.name))
            .map(|l| l.code.clone())
            .collect()
    }
}

impl DashboardConfig {
    pub(crate) fn normalize_indicators(&self, records: Vec<IndicatorRecord>) -> Vec<Indicator> {
        normalize_indicators(records, &self.canonical_source)
    }

    pub(crate) fn normalize_locations(&self, records: Vec<CountryRecord>) -> Vec<Location> {
        normalize_locations(records, &self.excluded_location_codes)
    }
}
