//! In-memory [`ResourceUpdater`].

use async_trait::async_trait;
use iam_core::{BackendError, Policy};
use iam_engine::ResourceUpdater;
use parking_lot::Mutex;

/// Policy store that records every call.
///
/// By default `set_policy` stores whatever it receives. With
/// [`FakeResourceUpdater::with_etag_enforcement`] it behaves like a real
/// backend: a stale etag is rejected and each successful write bumps the
/// version token.
#[derive(Debug)]
pub struct FakeResourceUpdater {
    label: String,
    state: Mutex<UpdaterState>,
}

#[derive(Debug, Default)]
struct UpdaterState {
    current: Policy,
    enforce_etag: bool,
    version: u64,
    get_calls: usize,
    set_calls: Vec<Policy>,
    get_error: Option<BackendError>,
    set_error: Option<BackendError>,
    write_after_get: Option<Policy>,
}

impl FakeResourceUpdater {
    /// Store starting with `policy`.
    #[must_use]
    pub fn new(policy: Policy) -> Self {
        Self {
            label: "fake/resource".to_string(),
            state: Mutex::new(UpdaterState {
                current: policy,
                ..UpdaterState::default()
            }),
        }
    }

    /// Reject stale etags and bump the version token on every write.
    #[must_use]
    pub fn with_etag_enforcement(self) -> Self {
        self.state.lock().enforce_etag = true;
        self
    }

    /// Label returned by `describe`.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Make every `get_policy` fail.
    pub fn fail_get(&self, error: BackendError) {
        self.state.lock().get_error = Some(error);
    }

    /// Make every `set_policy` fail.
    pub fn fail_set(&self, error: BackendError) {
        self.state.lock().set_error = Some(error);
    }

    /// Simulate another writer committing `policy` right after the next read.
    pub fn write_after_next_get(&self, policy: Policy) {
        self.state.lock().write_after_get = Some(policy);
    }

    /// Number of `get_policy` calls.
    #[must_use]
    pub fn get_calls(&self) -> usize {
        self.state.lock().get_calls
    }

    /// Policies received by `set_policy`, in call order.
    #[must_use]
    pub fn set_calls(&self) -> Vec<Policy> {
        self.state.lock().set_calls.clone()
    }

    /// The stored policy.
    #[must_use]
    pub fn current(&self) -> Policy {
        self.state.lock().current.clone()
    }
}

#[async_trait]
impl ResourceUpdater for FakeResourceUpdater {
    async fn get_policy(&self) -> Result<Policy, BackendError> {
        let mut state = self.state.lock();
        state.get_calls += 1;
        if let Some(error) = state.get_error.clone() {
            return Err(error);
        }

        let snapshot = state.current.clone();
        if let Some(concurrent) = state.write_after_get.take() {
            state.current = concurrent;
        }
        Ok(snapshot)
    }

    async fn set_policy(&self, policy: Policy) -> Result<Policy, BackendError> {
        let mut state = self.state.lock();
        state.set_calls.push(policy.clone());
        if let Some(error) = state.set_error.clone() {
            return Err(error);
        }

        if !state.enforce_etag {
            state.current = policy;
            return Ok(state.current.clone());
        }

        if policy.etag != state.current.etag {
            return Err(BackendError::VersionMismatch(format!(
                "etag {:?} does not match current {:?}",
                policy.etag, state.current.etag
            )));
        }

        state.version += 1;
        let etag = format!("{}+{}", policy.etag, state.version);
        state.current = Policy::new(policy.bindings, etag);
        Ok(state.current.clone())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
