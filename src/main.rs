//! Toolkeeper backend
//!
//! Boots the HTTP backend for tool kits, tools and employees.
//!
//! # Architecture Overview
//!
//! ```text
//!     settings file + TOOLKEEPER__* env
//!                 │
//!                 ▼
//!         ┌──────────────┐   fails → stderr, exit 1 (nothing logged)
//!         │    config    │
//!         └──────┬───────┘
//!                ▼
//!         ┌──────────────┐   console (info) + daily file (warn)
//!         │   logging    │
//!         └──────┬───────┘
//!                ▼
//!   Compose → Probe → Migrate → Assemble → Serve
//!      │        │        │          │         │
//!   clients   model    schema   error mw   listener
//!   db pool   API      (fatal)  + CORS     + graceful
//!   services  (warn)            + trace    shutdown
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use toolkeeper::config::load_settings;
use toolkeeper::lifecycle::{self, signals, Shutdown};
use toolkeeper::observability::init_logging;

#[derive(Debug, Parser)]
#[command(name = "toolkeeper-backend", version, about = "Toolkeeper HTTP backend")]
struct Args {
    /// Settings file (TOML).
    #[arg(long, env = "TOOLKEEPER_CONFIG", default_value = "config/toolkeeper.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Logging is not up yet; configuration errors go to stderr only.
    let settings = match load_settings(&args.config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("failed to load settings from {}: {}", args.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let logger = match init_logging(&settings.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        "toolkeeper-backend starting"
    );

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(signals::forward_to(shutdown));

    let code = match lifecycle::run(settings, receiver).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(stage = %e.stage(), error = %e, "Startup aborted");
            ExitCode::FAILURE
        }
    };

    logger.shutdown();
    code
}
