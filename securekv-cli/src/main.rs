//! `securekv`: developer CLI over the SecureKV storage protocol.
//!
//! Parses CLI arguments, initializes structured logging and dispatches to the
//! command handler. Library records emitted through `log` are bridged into
//! `tracing`; secret values are never logged at any level.

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn init_tracing() -> eyre::Result<()> {
    tracing_log::LogTracer::init()?;
    // RUST_LOG=securekv_core=debug shows every store call.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("securekv=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> eyre::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    commands::execute(&cli, &mut stdout)
}
