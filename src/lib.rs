//! wbi_dash
//!
//! Core of a World Bank indicator dashboard: pick an indicator, countries or
//! regions and a year range; get back chart-ready series, a map frame, and
//! the notices to show the user. Pairs with the `wbi-dash` CLI.
//!
//! ### Features
//! - Paged client for the indicator, country/region and observation endpoints
//! - Reference lists memoized per [`cache::ReferenceCache`], observations per query key
//! - Region expansion into deduplicated member countries
//! - Flat rows → wide year×country table → long table with formatted values
//! - Plotly line, bar and choropleth figures in a standalone HTML page
//!
//! ### Example
//! ```no_run
//! use wbi_dash::{Client, ClientConfig, Dashboard, DashboardConfig, Selection, YearRange};
//!
//! let client = Client::new(ClientConfig::default())?;
//! let dash = Dashboard::new(client, DashboardConfig::default());
//! let selection = Selection::new(
//!     "NY.GDP.MKTP.CD",
//!     vec!["EUU".into(), "USA".into()],
//!     YearRange::new(2015, 2020)?,
//! );
//! let view = dash.run(&selection)?;
//! wbi_dash::storage::save_html(&wbi_dash::view::render_html(&view), "gdp.html")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod expand;
pub mod format;
pub mod map;
pub mod models;
pub mod reshape;
pub mod storage;
pub mod view;

pub use api::{Client, HttpTransport, Transport};
pub use config::{ClientConfig, DashboardConfig};
pub use dashboard::{ChartToggles, Dashboard, DashboardView, Notice, NoticeLevel, Selection};
pub use error::{FetchError, SelectionError};
pub use expand::{Expansion, Resolver, expand};
pub use models::{Indicator, Location, Observation, Resolution, YearRange};
pub use reshape::{LongRow, SeriesTable, reshape, reshape_over, widen};
