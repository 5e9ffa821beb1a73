//! # Course Composer
//!
//! Command-line entry point.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use composer_cli::{run, CliArgs, ComposerConfig, RunStatus};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let args = CliArgs::parse();
    let config = ComposerConfig::from(args);
    tracing::debug!(command = ?config.command, "starting course-composer");

    let mut stdout = io::stdout().lock();
    match run(&config, &mut stdout)? {
        RunStatus::Success => Ok(ExitCode::SUCCESS),
        RunStatus::Failed => Ok(ExitCode::FAILURE),
    }
}

/// Initialize structured tracing on stderr with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,composer_core=info,composer_renderer=info).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,composer_core=info,composer_renderer=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_file(false);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}
