//! Memoization for the expensive lookups.
//!
//! - [`ReferenceCache`]: indicator and location lists, computed once for the
//!   lifetime of the cache value. No runtime invalidation; create a new value
//!   for a clean slate.
//! - [`ObservationCache`]: observation rows keyed by every input that shapes
//!   the result (indicator, code set, year range).

use crate::api::{Client, Transport};
use crate::config::DashboardConfig;
use crate::error::FetchError;
use crate::models::{Indicator, Location, Observation, YearRange};
use ahash::AHashMap;
use log::debug;
use once_cell::sync::OnceCell;
use std::collections::BTreeSet;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct ReferenceCache {
    indicators: OnceCell<Vec<Indicator>>,
    locations: OnceCell<Vec<Location>>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filtered indicator list. Fetched on first use; a failed fetch is not cached.
    pub fn indicators<T: Transport>(
        &self,
        client: &Client<T>,
        config: &DashboardConfig,
    ) -> Result<&[Indicator], FetchError> {
        self.indicators
            .get_or_try_init(|| -> Result<_, FetchError> {
                let records = client.fetch_indicators()?;
                Ok(config.normalize_indicators(records))
            })
            .map(Vec::as_slice)
    }

    /// Filtered location list. Fetched on first use; a failed fetch is not cached.
    pub fn locations<T: Transport>(
        &self,
        client: &Client<T>,
        config: &DashboardConfig,
    ) -> Result<&[Location], FetchError> {
        self.locations
            .get_or_try_init(|| -> Result<_, FetchError> {
                let records = client.fetch_locations()?;
                Ok(config.normalize_locations(records))
            })
            .map(Vec::as_slice)
    }

    pub fn is_loaded(&self) -> bool {
        self.indicators.get().is_some() && self.locations.get().is_some()
    }
}

/// Everything that affects an observation query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub indicator: String,
    pub codes: BTreeSet<String>,
    pub range: YearRange,
}

impl QueryKey {
    /// Codes are upper-cased and collected into a set, so order and case do not split entries.
    pub fn new<S: AsRef<str>>(indicator: &str, codes: &[S], range: YearRange) -> Self {
        Self {
            indicator: indicator.trim().to_string(),
            codes: codes
                .iter()
                .map(|c| c.as_ref().trim().to_ascii_uppercase())
                .filter(|c| !c.is_empty())
                .collect(),
            range,
        }
    }
}

#[derive(Debug, Default)]
pub struct ObservationCache {
    entries: Mutex<AHashMap<QueryKey, Vec<Observation>>>,
}

impl ObservationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return cached rows for `key`, or run `fetch` and cache its success.
    pub fn get_or_fetch<F>(&self, key: &QueryKey, fetch: F) -> Result<Vec<Observation>, FetchError>
    where
        F: FnOnce() -> Result<Vec<Observation>, FetchError>,
    {
        if let Some(hit) = self.lock().get(key) {
            debug!("observation cache hit for {}", key.indicator);
            return Ok(hit.clone());
        }
        // The lock is not held across the request.
        let rows = fetch()?;
        self.lock().insert(key.clone(), rows.clone());
        Ok(rows)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AHashMap<QueryKey, Vec<Observation>>> {
        // Poisoning is ignored: every write is a single insert or clear.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
