//! Principal lookups in bounded batches.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use iam_core::{
    BackendError, IamError, IamResult, MAX_PRINCIPALS_PER_BATCH, MemberType, Principal,
    PrincipalView,
};
use tracing::{debug, instrument};

/// Batch lookup of principal records within an organization.
///
/// Callers never pass more than [`MAX_PRINCIPALS_PER_BATCH`] ids per call.
/// Transport-level paging, if any, is the implementation's concern.
#[async_trait]
pub trait PrincipalService: Send + Sync {
    /// Fetch the records for `principal_ids` at the requested detail level.
    async fn batch_get_principals(
        &self,
        org_id: &str,
        principal_ids: &[String],
        view: PrincipalView,
    ) -> Result<Vec<Principal>, BackendError>;
}

/// Resolves principal ids through a [`PrincipalService`].
///
/// Ids are split into chunks of at most [`MAX_PRINCIPALS_PER_BATCH`] and
/// requested one chunk at a time. Results are concatenated in request order.
/// The first failing chunk fails the whole call and nothing is returned.
#[derive(Clone)]
pub struct PrincipalResolver {
    service: Arc<dyn PrincipalService>,
    batch_size: usize,
}

impl fmt::Debug for PrincipalResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrincipalResolver")
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl PrincipalResolver {
    /// Create a resolver using the maximum batch size.
    #[must_use]
    pub fn new(service: Arc<dyn PrincipalService>) -> Self {
        Self {
            service,
            batch_size: MAX_PRINCIPALS_PER_BATCH,
        }
    }

    /// Use a smaller batch size. Clamped to `1..=MAX_PRINCIPALS_PER_BATCH`.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_PRINCIPALS_PER_BATCH);
        self
    }

    /// Current batch size.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Resolve all `principal_ids`, all-or-nothing.
    ///
    /// # Errors
    /// Returns [`IamError::Backend`] from the first chunk that fails.
    #[instrument(skip(self, principal_ids), fields(count = principal_ids.len()))]
    pub async fn batch_resolve(
        &self,
        org_id: &str,
        principal_ids: &[String],
        view: PrincipalView,
    ) -> IamResult<Vec<Principal>> {
        let mut resolved = Vec::with_capacity(principal_ids.len());

        for (index, chunk) in principal_ids.chunks(self.batch_size).enumerate() {
            debug!(chunk = index, size = chunk.len(), "Resolving principal batch");
            let principals = self
                .service
                .batch_get_principals(org_id, chunk, view)
                .await
                .map_err(|e| IamError::backend("failed to resolve principals", e))?;
            resolved.extend(principals);
        }

        Ok(resolved)
    }

    /// Look up a single principal's member type.
    ///
    /// # Errors
    /// Returns [`IamError::PrincipalResolution`] if the service returns zero or
    /// several records, [`IamError::UnspecifiedPrincipalType`] for an
    /// unclassified record, or a backend error from the lookup.
    pub async fn resolve_member_type(
        &self,
        org_id: &str,
        principal_id: &str,
    ) -> IamResult<MemberType> {
        let ids = [principal_id.to_string()];
        let principals = self
            .batch_resolve(org_id, &ids, PrincipalView::Basic)
            .await?;

        match principals.as_slice() {
            [principal] => principal.member_type(),
            [] => Err(IamError::PrincipalResolution {
                principal_id: principal_id.to_string(),
                reason: "no principal returned".to_string(),
            }),
            many => Err(IamError::PrincipalResolution {
                principal_id: principal_id.to_string(),
                reason: format!("expected 1 principal, got {}", many.len()),
            }),
        }
    }
}
