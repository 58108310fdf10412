//! One dashboard evaluation: selection in, charts-ready data and notices out.
//!
//! Failures never abort a run. A transport failure becomes a warning with
//! empty data; an empty result becomes an informational notice and the
//! dependent charts are skipped.

use crate::api::{Client, Transport};
use crate::cache::{ObservationCache, QueryKey, ReferenceCache};
use crate::catalog::Catalog;
use crate::config::DashboardConfig;
use crate::error::SelectionError;
use crate::expand::{Expansion, expand};
use crate::format::NumberFormat;
use crate::map::MapFrame;
use crate::models::{Indicator, Location, Observation, YearRange};
use crate::reshape::{LongRow, SeriesTable, reshape_over};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("valid code regex"));

pub const MSG_NO_SELECTION: &str = "Please select at least one country or region.";
pub const MSG_NO_SERIES: &str = "No data found for these regions for chart analysis.";
pub const MSG_NO_MAP: &str = "No map data for the selected year.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartToggles {
    pub line: bool,
    pub bar: bool,
    pub map: bool,
}

impl Default for ChartToggles {
    fn default() -> Self {
        Self {
            line: true,
            bar: false,
            map: true,
        }
    }
}

/// What the user picked.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub indicator: String,
    pub locations: Vec<String>,
    pub range: YearRange,
    pub charts: ChartToggles,
    /// Year shown by the bar chart and map; defaults to the start of `range`.
    pub focus_year: Option<i32>,
    /// Chart member countries of selected regions individually as well.
    pub show_members: bool,
}

impl Selection {
    pub fn new(indicator: impl Into<String>, locations: Vec<String>, range: YearRange) -> Self {
        Self {
            indicator: indicator.into(),
            locations,
            range,
            charts: ChartToggles::default(),
            focus_year: None,
            show_members: false,
        }
    }

    pub fn focus_year(&self) -> i32 {
        self.range.clamp_year(self.focus_year.unwrap_or(self.range.start()))
    }

    /// Check the codes are well-formed and the indicator exists in the catalog.
    pub fn validate(&self, catalog: &Catalog<'_>) -> Result<(), SelectionError> {
        for code in std::iter::once(&self.indicator).chain(&self.locations) {
            if !CODE_RE.is_match(code.trim()) {
                return Err(SelectionError::MalformedCode(code.clone()));
            }
        }
        if !catalog.indicators.is_empty() && catalog.indicator(&self.indicator).is_none() {
            return Err(SelectionError::UnknownIndicator(self.indicator.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// A message shown inline to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        let message = message.into();
        info!("{message}");
        Self {
            level: NoticeLevel::Info,
            message,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!("{message}");
        Self {
            level: NoticeLevel::Warning,
            message,
        }
    }
}

/// Everything the view layer needs for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub indicator: Indicator,
    /// Display names of the selected locations, in selection order.
    pub selected_names: Vec<String>,
    pub range: YearRange,
    pub focus_year: i32,
    pub charts: ChartToggles,
    pub series: SeriesTable,
    /// Rows of `series` for the focus year, bar-chart order.
    pub bars: Vec<LongRow>,
    pub map: Option<MapFrame>,
    pub expansion: Expansion,
    pub notices: Vec<Notice>,
}

impl DashboardView {
    fn empty(indicator: Indicator, selection: &Selection) -> Self {
        Self {
            indicator,
            selected_names: Vec::new(),
            range: selection.range,
            focus_year: selection.focus_year(),
            charts: selection.charts,
            series: SeriesTable::default(),
            bars: Vec::new(),
            map: None,
            expansion: Expansion::default(),
            notices: Vec::new(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        self.notices.iter().any(|n| n.level == NoticeLevel::Warning)
    }
}

/// Client plus the caches scoped to it.
#[derive(Debug)]
pub struct Dashboard<T> {
    client: Client<T>,
    config: DashboardConfig,
    reference: ReferenceCache,
    observations: ObservationCache,
}

impl<T: Transport> Dashboard<T> {
    pub fn new(client: Client<T>, config: DashboardConfig) -> Self {
        Self {
            client,
            config,
            reference: ReferenceCache::new(),
            observations: ObservationCache::new(),
        }
    }

    pub fn client(&self) -> &Client<T> {
        &self.client
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn observation_cache(&self) -> &ObservationCache {
        &self.observations
    }

    /// Indicator list, or an empty list plus a warning if it cannot be loaded.
    pub fn indicators(&self, notices: &mut Vec<Notice>) -> &[Indicator] {
        match self.reference.indicators(&self.client, &self.config) {
            Ok(list) => list,
            Err(e) => {
                notices.push(Notice::warning(format!("Failed to load indicators: {e}")));
                &[]
            }
        }
    }

    /// Location list, or an empty list plus a warning if it cannot be loaded.
    pub fn locations(&self, notices: &mut Vec<Notice>) -> &[Location] {
        match self.reference.locations(&self.client, &self.config) {
            Ok(list) => list,
            Err(e) => {
                notices.push(Notice::warning(format!("Failed to load countries: {e}")));
                &[]
            }
        }
    }

    pub fn catalog(&self, notices: &mut Vec<Notice>) -> Catalog<'_> {
        Catalog::new(self.indicators(notices), self.locations(notices))
    }

    /// Location codes for display names; unknown names are skipped with a warning.
    pub fn codes_for_names<S: AsRef<str>>(&self, names: &[S], notices: &mut Vec<Notice>) -> Vec<String> {
        let catalog = Catalog::new(&[], self.locations(notices));
        let unknown: Vec<&str> = names
            .iter()
            .map(AsRef::as_ref)
            .filter(|n| !catalog.locations.iter().any(|l| l.name == *n))
            .collect();
        if !unknown.is_empty() {
            notices.push(Notice::warning(format!(
                "Unknown location names: {}",
                unknown.join(", ")
            )));
        }
        catalog.codes_for_names(names)
    }

    /// Expand selected codes against the cached location list.
    pub fn expand(&self, codes: &[String], notices: &mut Vec<Notice>) -> Expansion {
        let locations = self.locations(notices);
        self.expand_with(locations, codes, notices)
    }

    fn expand_with(
        &self,
        locations: &[Location],
        codes: &[String],
        notices: &mut Vec<Notice>,
    ) -> Expansion {
        let expansion = expand(&self.client, locations, codes);
        if !expansion.unresolved.is_empty() {
            let list: Vec<&str> = expansion.unresolved.iter().map(String::as_str).collect();
            notices.push(Notice::warning(format!(
                "Unresolved codes shown as-is: {}",
                list.join(", ")
            )));
        }
        expansion
    }

    /// Observations through the cache; a failed fetch is a warning and no rows.
    pub fn observations(
        &self,
        indicator: &str,
        codes: &[String],
        range: YearRange,
        notices: &mut Vec<Notice>,
    ) -> Vec<Observation> {
        let key = QueryKey::new(indicator, codes, range);
        let query_codes: Vec<String> = key.codes.iter().cloned().collect();
        let fetched = self.observations.get_or_fetch(&key, || {
            self.client.fetch_observations(indicator, &query_codes, range)
        });
        match fetched {
            Ok(rows) => rows,
            Err(e) => {
                notices.push(Notice::warning(format!("Failed to load data: {e}")));
                Vec::new()
            }
        }
    }

    /// Evaluate the whole pipeline for one selection.
    pub fn run(&self, selection: &Selection) -> Result<DashboardView, SelectionError> {
        let mut notices = Vec::new();
        let catalog = self.catalog(&mut notices);
        selection.validate(&catalog)?;

        let fmt = NumberFormat::for_locale(&self.config.locale);
        let indicator = catalog
            .indicator(&selection.indicator)
            .cloned()
            .unwrap_or_else(|| Indicator {
                code: selection.indicator.clone(),
                name: selection.indicator.clone(),
            });

        let mut view = DashboardView::empty(indicator, selection);
        let selected: Vec<String> = dedup_codes(&selection.locations);
        if selected.is_empty() {
            notices.push(Notice::info(MSG_NO_SELECTION));
            view.notices = notices;
            return Ok(view);
        }
        view.selected_names = selected
            .iter()
            .map(|c| catalog.location(c).map_or_else(|| c.clone(), |l| l.name.clone()))
            .collect();

        let expansion = self.expand_with(catalog.locations, &selected, &mut notices);

        // Line/bar series: the selected codes, plus region members on request.
        let mut chart_codes: BTreeSet<String> = selected.iter().cloned().collect();
        if selection.show_members && expansion.any_region {
            chart_codes.extend(expansion.codes.iter().cloned());
        }

        // One query covers both the chart codes and the map's expanded countries.
        let query: Vec<String> = chart_codes.union(&expansion.codes).cloned().collect();
        let rows = self.observations(&view.indicator.code, &query, selection.range, &mut notices);

        let chart_rows: Vec<Observation> = rows
            .iter()
            .filter(|o| chart_codes.iter().any(|c| o.matches_code(c)))
            .cloned()
            .collect();
        view.series = reshape_over(&chart_rows, selection.range, &fmt);
        if view.series.is_empty() {
            notices.push(Notice::info(MSG_NO_SERIES));
        } else if selection.charts.bar {
            view.bars = view.series.for_year(view.focus_year);
        }

        let map_rows: Vec<Observation> = rows
            .iter()
            .filter(|o| expansion.codes.iter().any(|c| o.matches_code(c)))
            .cloned()
            .collect();
        // The map has its own rows: a region aggregate may be empty while its members are not.
        if selection.charts.map && !map_rows.is_empty() {
            let frame = MapFrame::for_year(&map_rows, view.focus_year, &fmt);
            if frame.is_empty() {
                notices.push(Notice::info(MSG_NO_MAP));
            } else {
                view.map = Some(frame);
            }
        }

        view.expansion = expansion;
        view.notices = notices;
        Ok(view)
    }
}

/// Trimmed, upper-cased, first occurrence kept.
fn dedup_codes(codes: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    codes
        .iter()
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty() && seen.insert(c.clone()))
        .collect()
}
