//! Read-modify-write policy mutations.

use std::fmt;
use std::sync::Arc;

use iam_core::{BindingMap, IamError, IamResult, Policy, normalize_role};
use tracing::{debug, info, instrument, warn};

use crate::{PrincipalResolver, ResourceUpdater};

const FETCH_CONTEXT: &str = "failed to retrieve existing policy";
const STORE_CONTEXT: &str = "failed to update policy";

/// Mutates the policy of one resource through a [`ResourceUpdater`].
///
/// Each operation is a self-contained sequence; nothing is kept between
/// calls. Optimistic concurrency is left to the backend's version token and
/// a version mismatch is returned as-is, never retried.
#[derive(Clone)]
pub struct PolicySetter {
    updater: Arc<dyn ResourceUpdater>,
    resolver: PrincipalResolver,
    org_id: String,
}

impl fmt::Debug for PolicySetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicySetter")
            .field("resource", &self.updater.describe())
            .field("resolver", &self.resolver)
            .field("org_id", &self.org_id)
            .finish()
    }
}

impl PolicySetter {
    /// Create a setter. `org_id` scopes principal lookups.
    #[must_use]
    pub fn new(
        updater: Arc<dyn ResourceUpdater>,
        resolver: PrincipalResolver,
        org_id: impl Into<String>,
    ) -> Self {
        Self {
            updater,
            resolver,
            org_id: org_id.into(),
        }
    }

    /// Organization scope used for principal lookups.
    #[must_use]
    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    /// Replace the resource's policy.
    ///
    /// A policy without a version token picks up the current one first. That
    /// fetch and the write are not atomic: a writer landing in between wins
    /// and this write still succeeds against the token it read.
    ///
    /// # Errors
    /// Backend failures from either step, wrapped with the step context.
    #[instrument(skip(self, policy), fields(resource = %self.updater.describe(), bindings = policy.bindings.len()))]
    pub async fn set_policy(&self, mut policy: Policy) -> IamResult<Policy> {
        if !policy.has_etag() {
            debug!("Policy has no etag, fetching current version");
            let current = self.fetch().await?;
            policy.etag = current.etag;
        }

        let stored = self.store(policy).await?;
        info!(etag = %stored.etag, "Policy replaced");
        Ok(stored)
    }

    /// Grant `role_id` to `principal_id`.
    ///
    /// # Errors
    /// - [`IamError::PrincipalResolution`] / [`IamError::UnspecifiedPrincipalType`]
    ///   if the principal cannot be classified
    /// - [`IamError::AlreadyBound`] if the binding exists; nothing is written
    /// - backend failures, including version mismatch
    #[instrument(skip(self), fields(resource = %self.updater.describe()))]
    pub async fn add_binding(&self, principal_id: &str, role_id: &str) -> IamResult<Policy> {
        let role_id = normalize_role(role_id);
        let member_type = self
            .resolver
            .resolve_member_type(&self.org_id, principal_id)
            .await?;

        let current = self.fetch().await?;
        let mut map = BindingMap::from_policy(&current);

        if map.contains(&role_id, principal_id) {
            return Err(IamError::AlreadyBound {
                principal_id: principal_id.to_string(),
                role_id,
            });
        }

        map.insert(&role_id, principal_id, member_type);
        let stored = self.store(map.into_policy(current.etag)).await?;
        info!(%role_id, %member_type, "Binding added");
        Ok(stored)
    }

    /// Revoke `role_id` from `principal_id`.
    ///
    /// Removing a role's last member removes the role's binding entirely.
    ///
    /// # Errors
    /// - [`IamError::NotBound`] if the binding does not exist; nothing is written
    /// - backend failures, including version mismatch
    #[instrument(skip(self), fields(resource = %self.updater.describe()))]
    pub async fn delete_binding(&self, principal_id: &str, role_id: &str) -> IamResult<Policy> {
        let role_id = normalize_role(role_id);

        let current = self.fetch().await?;
        let mut map = BindingMap::from_policy(&current);

        if map.remove(&role_id, principal_id).is_none() {
            return Err(IamError::NotBound {
                principal_id: principal_id.to_string(),
                role_id,
            });
        }

        let stored = self.store(map.into_policy(current.etag)).await?;
        info!(%role_id, "Binding removed");
        Ok(stored)
    }

    async fn fetch(&self) -> IamResult<Policy> {
        self.updater
            .get_policy()
            .await
            .map_err(|e| IamError::backend(FETCH_CONTEXT, e))
    }

    async fn store(&self, policy: Policy) -> IamResult<Policy> {
        let etag = policy.etag.clone();
        self.updater.set_policy(policy).await.map_err(|e| {
            let err = IamError::backend(STORE_CONTEXT, e);
            if err.is_version_mismatch() {
                warn!(%etag, "Policy changed concurrently, version token is stale");
            }
            err
        })
    }
}
