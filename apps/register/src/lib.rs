//! # Mesa Register Library
//!
//! The register session: state, role-gated commands, receipts and the CLI.
//!
//! ## Module Organization
//! ```text
//! mesa_register/
//! ├── lib.rs          ◄─── You are here (exports, logging setup)
//! ├── state/
//! │   ├── mod.rs      ◄─── Register bundle, state exports
//! │   ├── config.rs   ◄─── register.toml + MESA_* overrides
//! │   ├── draft.rs    ◄─── Shared order draft
//! │   └── session.rs  ◄─── Role and data source
//! ├── commands/
//! │   ├── catalog.rs  ◄─── Menu and customers
//! │   ├── order.rs    ◄─── Draft editing
//! │   ├── discount.rs ◄─── Discount codes
//! │   └── checkout.rs ◄─── Payment and order status
//! ├── receipt.rs      ◄─── Printable receipt
//! ├── cli.rs          ◄─── clap front end
//! └── error.rs        ◄─── ApiError for commands
//! ```
//!
//! ## State Management
//! Each command function takes only the state it needs:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐     │
//! │  │   SourceState    │ │   DraftState     │ │   SessionState       │     │
//! │  │                  │ │                  │ │                      │     │
//! │  │  • Catalog       │ │  • Current order │ │  • Signed-in role    │     │
//! │  │  • Customers     │ │  • Totals        │ │  • Permission check  │     │
//! │  │  • Submit order  │ │                  │ │                      │     │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod receipt;
pub mod state;

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so `--json` output on stdout stays machine readable.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=mesa_data=trace` - Trace the data source only
/// - Default: INFO, DEBUG for the mesa crates
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,mesa=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
