//! Client configuration layering: flags and env (via clap) over a TOML file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use iam_http::IamClientConfig;
use serde::Deserialize;

use crate::cli::Cli;

/// On-disk configuration. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub org_id: Option<String>,
    pub api_token: Option<String>,
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub principal_batch_size: Option<usize>,
}

impl FileConfig {
    /// Parse a TOML config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
    }
}

/// Values taken from flags or their environment variables.
#[derive(Debug, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub org_id: Option<String>,
    pub api_token: Option<String>,
}

/// Build the client config for this invocation.
pub fn load(cli: &Cli) -> Result<IamClientConfig> {
    let file = match &cli.config {
        Some(path) => FileConfig::from_path(path)?,
        None => FileConfig::default(),
    };
    let overrides = Overrides {
        base_url: cli.base_url.clone(),
        org_id: cli.org.clone(),
        api_token: cli.api_token.clone(),
    };
    resolve(overrides, file)
}

/// Merge overrides onto file values and validate.
pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<IamClientConfig> {
    let base_url = overrides
        .base_url
        .or(file.base_url)
        .context("no IAM base URL configured (use --base-url or IAM_BASE_URL)")?;
    let org_id = overrides
        .org_id
        .or(file.org_id)
        .context("no organization configured (use --org or IAM_ORG_ID)")?;

    let mut config = IamClientConfig::new(base_url, org_id);
    config.api_token = overrides.api_token.or(file.api_token);
    if let Some(ms) = file.connect_timeout_ms {
        config.connect_timeout_ms = ms;
    }
    if let Some(ms) = file.request_timeout_ms {
        config.request_timeout_ms = ms;
    }
    if let Some(size) = file.principal_batch_size {
        config.principal_batch_size = size;
    }

    config.validate().context("invalid IAM client configuration")?;
    Ok(config)
}
