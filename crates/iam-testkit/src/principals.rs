//! In-memory [`PrincipalService`].

use std::collections::HashMap;

use async_trait::async_trait;
use iam_core::{BackendError, Principal, PrincipalKind, PrincipalView};
use iam_engine::PrincipalService;
use parking_lot::Mutex;

/// Directory of principal records that records every batch request.
///
/// Ids missing from the directory are left out of the response. Registering
/// the same id twice makes a lookup return both records.
#[derive(Debug, Default)]
pub struct FakePrincipalService {
    directory: HashMap<String, Vec<Principal>>,
    state: Mutex<ServiceState>,
}

#[derive(Debug, Default)]
struct ServiceState {
    batches: Vec<Vec<String>>,
    views: Vec<PrincipalView>,
    orgs: Vec<String>,
    failure: Option<(usize, BackendError)>,
}

impl FakePrincipalService {
    /// Empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a principal record.
    #[must_use]
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.directory
            .entry(principal.id.clone())
            .or_default()
            .push(principal);
        self
    }

    /// Register many principal records.
    #[must_use]
    pub fn with_principals(self, principals: impl IntoIterator<Item = Principal>) -> Self {
        principals.into_iter().fold(self, Self::with_principal)
    }

    /// Fail the `call`-th request (1-based) with `error`.
    pub fn fail_on_call(&self, call: usize, error: BackendError) {
        self.state.lock().failure = Some((call, error));
    }

    /// Ids requested per batch, in call order.
    #[must_use]
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.state.lock().batches.clone()
    }

    /// Size of each batch request.
    #[must_use]
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.state.lock().batches.iter().map(Vec::len).collect()
    }

    /// View requested per batch.
    #[must_use]
    pub fn views(&self) -> Vec<PrincipalView> {
        self.state.lock().views.clone()
    }

    /// Organization scope per batch.
    #[must_use]
    pub fn orgs(&self) -> Vec<String> {
        self.state.lock().orgs.clone()
    }

    fn project(principal: &Principal, view: PrincipalView) -> Principal {
        if view == PrincipalView::Full {
            return principal.clone();
        }
        let kind = match &principal.kind {
            PrincipalKind::User { .. } => PrincipalKind::User { full_name: None },
            PrincipalKind::Group { .. } => PrincipalKind::Group { display_name: None },
            PrincipalKind::Service { .. } => PrincipalKind::Service { name: None },
            PrincipalKind::Unspecified => PrincipalKind::Unspecified,
        };
        Principal {
            id: principal.id.clone(),
            kind,
        }
    }
}

#[async_trait]
impl PrincipalService for FakePrincipalService {
    async fn batch_get_principals(
        &self,
        org_id: &str,
        principal_ids: &[String],
        view: PrincipalView,
    ) -> Result<Vec<Principal>, BackendError> {
        let mut state = self.state.lock();
        state.batches.push(principal_ids.to_vec());
        state.views.push(view);
        state.orgs.push(org_id.to_string());

        let call = state.batches.len();
        if let Some((failing_call, error)) = &state.failure {
            if *failing_call == call {
                return Err(error.clone());
            }
        }

        Ok(principal_ids
            .iter()
            .filter_map(|id| self.directory.get(id))
            .flatten()
            .map(|p| Self::project(p, view))
            .collect())
    }
}
