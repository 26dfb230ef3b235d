//! # mesa-data: Data Sources for Mesa POS
//!
//! The register never talks to the backend directly. It holds an
//! `Arc<dyn DataSource>` chosen once at startup.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mesa POS Data Flow                               │
//! │                                                                         │
//! │  Register command (apply_discount, checkout, ...)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    mesa-data (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │                   trait DataSource                              │   │
//! │  │                    │               │                            │   │
//! │  │          ┌─────────▼─────┐   ┌─────▼──────────┐                 │   │
//! │  │          │  LiveSource   │   │ FixtureSource  │                 │   │
//! │  │          │  reqwest/JSON │   │ in-memory menu │                 │   │
//! │  │          └───────┬───────┘   └────────────────┘                 │   │
//! │  └──────────────────┼──────────────────────────────────────────────┘   │
//! │                     ▼                                                   │
//! │              Backend REST API                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`source`] - The `DataSource` trait
//! - [`live`] - HTTP implementation
//! - [`fixture`] - In-memory implementation
//! - [`error`] - Data source error types

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod error;
pub mod fixture;
pub mod live;
pub mod source;

pub use error::{DataError, DataResult};
pub use fixture::FixtureSource;
pub use live::LiveSource;
pub use source::DataSource;

/// Which data source a register session runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    /// The backend REST API.
    Live,
    /// Built-in fixture data.
    Fixture,
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceKind::Live => write!(f, "live"),
            DataSourceKind::Fixture => write!(f, "fixture"),
        }
    }
}

impl FromStr for DataSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "live" => Ok(DataSourceKind::Live),
            "fixture" | "mock" => Ok(DataSourceKind::Fixture),
            other => Err(format!("unknown data source '{}' (expected live or fixture)", other)),
        }
    }
}

/// Builds the data source for a session.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use mesa_data::{connect, DataSourceKind};
///
/// let source = connect(DataSourceKind::Fixture, "", Duration::from_secs(5)).unwrap();
/// assert_eq!(source.name(), "fixture");
/// ```
pub fn connect(
    kind: DataSourceKind,
    api_url: &str,
    timeout: Duration,
) -> DataResult<Arc<dyn DataSource>> {
    let source: Arc<dyn DataSource> = match kind {
        DataSourceKind::Live => Arc::new(LiveSource::new(api_url, timeout)?),
        DataSourceKind::Fixture => Arc::new(FixtureSource::new()),
    };

    tracing::info!(source = source.name(), %api_url, "Data source ready");
    Ok(source)
}
