//! IAM Engine - safe policy mutation over pluggable resource backends
//!
//! The engine never knows how a policy is transported or stored. Callers
//! implement two capabilities and inject them:
//!
//! - [`ResourceUpdater`]: fetch/store the policy of one resource
//!   (organization, project, group, ...)
//! - [`PrincipalService`]: batch lookup of principal records
//!
//! On top of those the engine provides:
//!
//! - [`PolicySetter`]: `set_policy`, `add_binding`, `delete_binding` as
//!   read-modify-write sequences guarded by the backend's version token
//! - [`PrincipalResolver`]: chunked, all-or-nothing principal lookups
//! - [`PolicyPresenter`]: flattens a policy into display rows
//!
//! # Concurrency
//!
//! Nothing is cached or shared between calls. Compare-and-swap is delegated
//! to the backend: two concurrent `add_binding` calls may read the same
//! version token and only one write succeeds. The engine does not retry on a
//! version mismatch; the error is returned to the caller.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use iam_engine::{PolicySetter, PrincipalResolver};
//!
//! let resolver = PrincipalResolver::new(Arc::new(principal_service));
//! let setter = PolicySetter::new(Arc::new(project_updater), resolver, "org-1");
//!
//! setter.add_binding("u-123", "viewer").await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod presenter;
mod principals;
mod setter;
mod updater;

pub use presenter::*;
pub use principals::*;
pub use setter::*;
pub use updater::*;

pub use iam_core::{
    BackendError, Binding, IamError, IamResult, Member, MemberType, Policy, Principal,
    PrincipalKind, PrincipalView, normalize_role,
};
