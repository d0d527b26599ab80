//! Per-resource policy storage capability.

use async_trait::async_trait;
use iam_core::{BackendError, Policy};

/// Fetch and store the policy of a single resource.
///
/// Implemented once per resource kind. `set_policy` is expected to reject a
/// stale `etag` with [`BackendError::VersionMismatch`]; the engine never
/// compares version tokens itself.
#[async_trait]
pub trait ResourceUpdater: Send + Sync {
    /// Fetch the current policy and its version token.
    async fn get_policy(&self) -> Result<Policy, BackendError>;

    /// Replace the resource's policy.
    async fn set_policy(&self, policy: Policy) -> Result<Policy, BackendError>;

    /// Label used in logs, e.g. `project/p-123`.
    fn describe(&self) -> String {
        "resource".to_string()
    }
}
