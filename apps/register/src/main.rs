//! # Mesa Register Entry Point
//!
//! ## Startup Sequence
//! 1. Parse arguments
//! 2. Initialize tracing (logging)
//! 3. Load config: defaults → register.toml → MESA_* env → CLI flags
//! 4. Connect the data source and build the session
//! 5. Run the command and print its output

use anyhow::Context;
use clap::Parser;
use tracing::info;

use mesa_register::cli::Cli;
use mesa_register::state::{Register, RegisterConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    mesa_register::init_tracing();

    let mut config =
        RegisterConfig::load(cli.config.clone()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    info!(
        store = %config.store.name,
        source = %config.data.source,
        role = %config.role(),
        "Starting Mesa register"
    );

    let register = Register::connect(config).context("Failed to start register session")?;
    let output = cli.execute(&register).await?;
    println!("{}", output);

    Ok(())
}
