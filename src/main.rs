//! # create-issuer entry point
//!
//! Generates the issuer profile (`.json`) needed for issuing and validating certificates.

use std::process::ExitCode;

use clap::Parser;
use issuer_profile::cli::{run, CreateIssuerArgs};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = CreateIssuerArgs::parse();

    // `RUST_LOG` takes precedence over the verbosity flag.
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
