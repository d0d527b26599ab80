//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::policy::PolicyArgs;
use crate::render::OutputFormat;

/// Inspect and edit resource IAM policies.
#[derive(Parser, Debug)]
#[command(name = "iamctl", version, about)]
pub struct Cli {
    /// TOML config file.
    #[arg(long, global = true, env = "IAM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Organization id. Scopes principal lookups.
    #[arg(long, global = true, env = "IAM_ORG_ID")]
    pub org: Option<String>,

    /// IAM service root URL.
    #[arg(long, global = true, env = "IAM_BASE_URL")]
    pub base_url: Option<String>,

    /// Bearer token.
    #[arg(long, global = true, env = "IAM_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Deadline for each operation, in seconds.
    #[arg(long, global = true, default_value_t = 120)]
    pub timeout_secs: u64,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read and modify resource policies.
    Policy(PolicyArgs),
}
