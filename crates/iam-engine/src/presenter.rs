//! Policy flattening for display.

use std::collections::{BTreeSet, HashMap};

use iam_core::{IamResult, MemberType, Policy, PrincipalView};
use serde::Serialize;
use tracing::instrument;

use crate::PrincipalResolver;

/// One (binding, member) pair with the member's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyRow {
    /// Role id.
    pub role_id: String,
    /// Display name; empty when the principal was not returned by the lookup.
    pub principal_name: String,
    /// Principal id.
    pub principal_id: String,
    /// Member type as stored in the policy.
    pub principal_type: MemberType,
}

/// Labels policy members with resolved display names.
#[derive(Debug, Clone)]
pub struct PolicyPresenter {
    resolver: PrincipalResolver,
}

impl PolicyPresenter {
    /// Create a presenter.
    #[must_use]
    pub const fn new(resolver: PrincipalResolver) -> Self {
        Self { resolver }
    }

    /// Resolve every distinct principal referenced by `policy`.
    ///
    /// # Errors
    /// Fails if the lookup fails or any principal comes back unclassified.
    #[instrument(skip(self, policy), fields(bindings = policy.bindings.len()))]
    pub async fn resolve(&self, org_id: &str, policy: Policy) -> IamResult<ResolvedPolicy> {
        let principal_ids: Vec<String> = policy
            .bindings
            .iter()
            .flat_map(|b| b.members.iter().map(|m| m.member_id.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let principals = self
            .resolver
            .batch_resolve(org_id, &principal_ids, PrincipalView::Full)
            .await?;

        let mut names = HashMap::with_capacity(principals.len());
        for principal in &principals {
            let name = principal.display_name()?.unwrap_or_default().to_string();
            names.insert(principal.id.clone(), name);
        }

        Ok(ResolvedPolicy { policy, names })
    }
}

/// A policy together with the display names of its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPolicy {
    policy: Policy,
    names: HashMap<String, String>,
}

impl ResolvedPolicy {
    /// Build from a policy and an id -> display name lookup.
    #[must_use]
    pub const fn new(policy: Policy, names: HashMap<String, String>) -> Self {
        Self { policy, names }
    }

    /// The underlying policy.
    #[must_use]
    pub const fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Display name for a principal id.
    #[must_use]
    pub fn name_of(&self, principal_id: &str) -> Option<&str> {
        self.names.get(principal_id).map(String::as_str)
    }

    /// One row per (binding, member), sorted by role id then principal id.
    #[must_use]
    pub fn flatten(&self) -> Vec<PolicyRow> {
        let mut rows: Vec<PolicyRow> = self
            .policy
            .bindings
            .iter()
            .flat_map(|binding| {
                binding.members.iter().map(|member| PolicyRow {
                    role_id: binding.role_id.clone(),
                    principal_name: self
                        .name_of(&member.member_id)
                        .unwrap_or_default()
                        .to_string(),
                    principal_id: member.member_id.clone(),
                    principal_type: member.member_type,
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            a.role_id
                .cmp(&b.role_id)
                .then_with(|| a.principal_id.cmp(&b.principal_id))
        });
        rows
    }
}
