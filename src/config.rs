//! Runtime configuration for the client and the dashboard pipeline.

use std::time::Duration;

/// World Bank API v2 root.
pub const DEFAULT_BASE_URL: &str = "https://api.worldbank.org/v2";

/// Source id of World Development Indicators, the only catalog the dashboard offers.
pub const WDI_SOURCE_ID: &str = "2";

/// Income-group aggregates the API reports as "countries". Selecting them would
/// double count against the regions, so they never reach the selectable list.
pub const INCOME_GROUP_CODES: [&str; 7] = ["HIC", "INX", "LIC", "LMC", "LMY", "MIC", "UMC"];

/// Code the catalog uses for "not applicable".
pub const NOT_APPLICABLE_CODE: &str = "NA";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Page size for every list request. Requests still page until exhausted.
    pub per_page: u32,
    /// Safety cap on pages per request.
    pub max_pages: u32,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            per_page: 20_000,
            max_pages: 1000,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Locale tag used for formatted values (`en`, `de`, `fr`, ...).
    pub locale: String,
    pub canonical_source: String,
    pub excluded_location_codes: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let mut excluded: Vec<String> = INCOME_GROUP_CODES.iter().map(|c| c.to_string()).collect();
        excluded.push(NOT_APPLICABLE_CODE.into());
        Self {
            locale: "en".into(),
            canonical_source: WDI_SOURCE_ID.into(),
            excluded_location_codes: excluded,
        }
    }
}
