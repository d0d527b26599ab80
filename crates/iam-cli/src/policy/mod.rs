//! `iamctl policy` command implementation.

use std::collections::HashMap;
use std::fs;
use std::future::Future;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use iam_core::{IamError, IamResult, Policy};
use iam_engine::{
    PolicyPresenter, PolicySetter, PrincipalResolver, ResolvedPolicy, ResourceUpdater,
};
use iam_http::{IamClientConfig, IamHttpClient, ResourceKind, ResourcePolicyClient};
use tracing::{debug, warn};

use crate::cli::Cli;
use crate::config;
use crate::render;

/// Arguments for the `iamctl policy` command.
#[derive(Args, Debug)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub command: PolicyCommands,
}

/// Policy subcommands.
#[derive(Subcommand, Debug)]
pub enum PolicyCommands {
    /// Show a resource's policy with principal names.
    Get(TargetArgs),
    /// Replace a resource's policy with a JSON document.
    Set(SetArgs),
    /// Grant a role to a principal.
    AddBinding(BindingArgs),
    /// Revoke a role from a principal.
    RemoveBinding(BindingArgs),
}

/// Resource selection shared by all policy subcommands.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Resource kind: organization, project or group.
    #[arg(long, value_name = "KIND")]
    pub resource: ResourceKind,

    /// Resource id. Defaults to the configured org for organization resources.
    #[arg(long)]
    pub id: Option<String>,
}

/// Arguments for `iamctl policy set`.
#[derive(Args, Debug)]
pub struct SetArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Policy document (JSON). Use "-" for stdin.
    #[arg(long)]
    pub file: PathBuf,
}

/// Arguments for `iamctl policy add-binding` and `remove-binding`.
#[derive(Args, Debug)]
pub struct BindingArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Principal id.
    #[arg(long)]
    pub principal: String,

    /// Role id, with or without the `roles/` prefix.
    #[arg(long)]
    pub role: String,
}

/// Run the policy command.
pub async fn run(args: &PolicyArgs, cli: &Cli) -> Result<()> {
    let config = config::load(cli)?;
    let client = IamHttpClient::new(&config).context("failed to build IAM client")?;
    let resolver = PrincipalResolver::new(Arc::new(client.clone()))
        .with_batch_size(config.principal_batch_size);
    let deadline = Duration::from_secs(cli.timeout_secs);

    let mutated = !matches!(args.command, PolicyCommands::Get(_));
    let policy = match &args.command {
        PolicyCommands::Get(target) => {
            let updater = updater(&client, &config, target)?;
            with_deadline(deadline, "get policy", async {
                updater
                    .get_policy()
                    .await
                    .map_err(|e| IamError::backend("failed to retrieve policy", e))
            })
            .await?
        }
        PolicyCommands::Set(set) => {
            let document = read_input(&set.file)?;
            let policy = Policy::from_json_str(&document)
                .with_context(|| format!("invalid policy document {}", set.file.display()))?;
            let setter = setter(&client, &config, &set.target, resolver.clone())?;
            with_deadline(deadline, "set policy", setter.set_policy(policy)).await?
        }
        PolicyCommands::AddBinding(binding) => {
            let setter = setter(&client, &config, &binding.target, resolver.clone())?;
            with_deadline(
                deadline,
                "add binding",
                setter.add_binding(&binding.principal, &binding.role),
            )
            .await?
        }
        PolicyCommands::RemoveBinding(binding) => {
            let setter = setter(&client, &config, &binding.target, resolver.clone())?;
            with_deadline(
                deadline,
                "remove binding",
                setter.delete_binding(&binding.principal, &binding.role),
            )
            .await?
        }
    };

    debug!(etag = %policy.etag, members = policy.member_count(), "Rendering policy");

    let presenter = PolicyPresenter::new(resolver);
    let resolved = match with_deadline(
        deadline,
        "resolve principals",
        presenter.resolve(&config.org_id, policy.clone()),
    )
    .await
    {
        Ok(resolved) => resolved,
        // The write already landed; only the names are missing.
        Err(err) if mutated => {
            warn!(
                error = %err,
                code = err.code(),
                "Policy stored but principal names could not be resolved"
            );
            ResolvedPolicy::new(policy, HashMap::new())
        }
        Err(err) => return Err(err.into()),
    };

    let rendered = render::render(&resolved.flatten(), cli.output)?;
    println!("{rendered}");
    Ok(())
}

fn updater(
    client: &IamHttpClient,
    config: &IamClientConfig,
    target: &TargetArgs,
) -> Result<ResourcePolicyClient> {
    let id = match (&target.id, target.resource) {
        (Some(id), _) => id.clone(),
        (None, ResourceKind::Organization) => config.org_id.clone(),
        (None, kind) => bail!("--id is required for {kind} resources"),
    };
    Ok(client.resource(target.resource, id))
}

fn setter(
    client: &IamHttpClient,
    config: &IamClientConfig,
    target: &TargetArgs,
    resolver: PrincipalResolver,
) -> Result<PolicySetter> {
    let updater: Arc<dyn ResourceUpdater> = Arc::new(updater(client, config, target)?);
    Ok(PolicySetter::new(updater, resolver, config.org_id.clone()))
}

/// Bound `operation` by `deadline`; elapsing drops it and yields `Cancelled`.
async fn with_deadline<T>(
    deadline: Duration,
    what: &str,
    operation: impl Future<Output = IamResult<T>>,
) -> IamResult<T> {
    tokio::time::timeout(deadline, operation)
        .await
        .map_err(|_| {
            IamError::Cancelled(format!("{what} exceeded {}s deadline", deadline.as_secs()))
        })?
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }

    fs::read_to_string(path).with_context(|| format!("failed to read input {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> (IamHttpClient, IamClientConfig) {
        let config = IamClientConfig::new("http://127.0.0.1:9", "org-1");
        (IamHttpClient::new(&config).unwrap(), config)
    }

    #[test]
    fn organization_defaults_to_configured_org() {
        let (client, config) = client();
        let target = TargetArgs {
            resource: ResourceKind::Organization,
            id: None,
        };
        let updater = updater(&client, &config, &target).unwrap();
        assert_eq!(updater.describe(), "organization/org-1");
    }

    #[test]
    fn project_requires_id() {
        let (client, config) = client();
        let target = TargetArgs {
            resource: ResourceKind::Project,
            id: None,
        };
        let err = updater(&client, &config, &target).unwrap_err();
        assert_eq!(err.to_string(), "--id is required for project resources");
    }

    #[tokio::test]
    async fn deadline_elapsing_is_cancelled() {
        let err = with_deadline(Duration::ZERO, "slow op", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, IamError::Cancelled(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn fast_operation_passes_through() {
        let value = with_deadline(Duration::from_secs(1), "fast op", async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
