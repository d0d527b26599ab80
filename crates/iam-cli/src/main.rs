//! `iamctl` - inspect and edit resource IAM policies.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod cli;
mod config;
mod policy;
mod render;

use std::process::ExitCode;

use clap::Parser;
use iam_core::IamError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Policy(args) => policy::run(args, &cli).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn report(err: &anyhow::Error) {
    match err.chain().find_map(|e| e.downcast_ref::<IamError>()) {
        Some(iam) => eprintln!("error[{}]: {err:#}", iam.code()),
        None => eprintln!("error: {err:#}"),
    }
}
