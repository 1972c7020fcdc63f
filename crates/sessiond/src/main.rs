//! sessiond: collaborative session server host.
//!
//! Builds the runtime settings store from the settings file, environment, and
//! command line, resolves the server limits, and runs until Ctrl-C.
//!
//! # Usage
//!
//! ```text
//! sessiond [OPTIONS]
//!
//! Options:
//!   --config <PATH>             Settings file [env: SESSIOND_CONFIG]
//!   --no-settings-file          Ignore the platform settings file
//!   --set <NAME=VALUE>          Override a setting (repeatable)
//!   --listing-whitelist <URL>   Allowed listing server (repeatable)
//!   --print-config              Print effective settings and exit
//!   --json                      With --print-config, print JSON
//! ```
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ build_store()        -- defaults < file < SESSIOND_* < --set
//!  └─ ServerState::new()   -- resolves ServerLimits, empty session list
//!  └─ wait for Ctrl-C
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use sessiond::infrastructure::environment::assignments_from_env;
use sessiond::infrastructure::startup::{
    build_store, render_settings, ServerState, SettingsLocation, StartupSources,
};
use sessiond::infrastructure::storage::settings::{parse_assignment, Assignment};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Collaborative session server.
#[derive(Debug, Parser)]
#[command(name = "sessiond", about = "Collaborative session server", version)]
struct Cli {
    /// Settings file to load instead of the platform default.
    #[arg(long, env = "SESSIOND_CONFIG")]
    config: Option<PathBuf>,

    /// Do not read any settings file, even if `--config` is given.
    #[arg(long)]
    no_settings_file: bool,

    /// Override a setting, e.g. `--set client-timeout=2m`.  Wins over the
    /// settings file and environment.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_set_arg)]
    set: Vec<Assignment>,

    /// Listing server sessions may be announced to while
    /// `announce-whitelist` is on.
    #[arg(long = "listing-whitelist", value_name = "URL")]
    listing_whitelist: Vec<Url>,

    /// Print every setting's effective value and exit.
    #[arg(long)]
    print_config: bool,

    /// Print `--print-config` output as JSON.
    #[arg(long, requires = "print_config")]
    json: bool,
}

fn parse_set_arg(arg: &str) -> Result<Assignment, String> {
    parse_assignment(arg).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let settings_file = match (cli.no_settings_file, cli.config) {
        (true, _) => SettingsLocation::Skip,
        (false, Some(path)) => SettingsLocation::Path(path),
        (false, None) => SettingsLocation::Platform,
    };
    let env = assignments_from_env(std::env::vars_os())
        .context("failed to read settings from the environment")?;
    let sources = StartupSources {
        settings_file,
        env,
        assignments: cli.set,
        listing_whitelist: cli.listing_whitelist,
    };
    let store = build_store(&sources).context("failed to load settings")?;

    if cli.print_config {
        print!("{}", render_settings(&store, cli.json).context("failed to read settings")?);
        return Ok(());
    }

    info!("sessiond starting");

    let state = ServerState::new(store);
    state.limits.lock().await.log_summary();

    info!("sessiond ready.  Press Ctrl-C to exit.");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown signal received");

    let listed = state.sessions.lock().await.len();
    info!(sessions = listed, "sessiond stopped");
    Ok(())
}
