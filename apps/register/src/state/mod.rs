//! # State Module
//!
//! Session state for the register.
//!
//! Commands take only the state they need, so each can be tested with a
//! fixture source and a fresh draft.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌─────────────┐  │
//! │  │  DraftState  │  │ SourceState  │  │ SessionState │  │ Register-   │  │
//! │  │              │  │              │  │              │  │ Config      │  │
//! │  │  Arc<Mutex<  │  │  Arc<dyn     │  │  role        │  │ store, tax, │  │
//! │  │  OrderDraft  │  │  DataSource> │  │              │  │ data source │  │
//! │  │  >>          │  │              │  │              │  │             │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └─────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DraftState: Arc<Mutex<T>>, never locked across an await             │
//! │  • SourceState: DataSource is Send + Sync                              │
//! │  • SessionState / RegisterConfig: read-only after startup              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod draft;
mod session;

use std::sync::Arc;

use mesa_data::DataSource;

pub use config::{
    ConfigError, DataSettings, PricingSettings, RegisterConfig, SessionSettings, StoreSettings,
};
pub use draft::DraftState;
pub use session::{SessionState, SourceState};

use crate::error::ApiError;

/// Everything one register session holds.
#[derive(Debug, Clone)]
pub struct Register {
    pub config: RegisterConfig,
    pub source: SourceState,
    pub session: SessionState,
    pub draft: DraftState,
}

impl Register {
    /// Builds a session over an existing data source.
    pub fn new(config: RegisterConfig, source: Arc<dyn DataSource>) -> Self {
        Register {
            source: SourceState::new(source),
            session: SessionState::new(config.role()),
            draft: DraftState::new(config.tax_rate()),
            config,
        }
    }

    /// Builds a session, connecting to the configured data source.
    pub fn connect(config: RegisterConfig) -> Result<Self, ApiError> {
        let source = mesa_data::connect(config.data.source, &config.data.api_url, config.timeout())?;
        Ok(Self::new(config, source))
    }
}
