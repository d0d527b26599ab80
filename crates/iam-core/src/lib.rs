//! IAM Core - policy model shared by the engine, transport and CLI
//!
//! This crate is pure data and conversions, no I/O:
//!
//! - **Model**: [`Policy`], [`Binding`], [`Member`] and the resolved [`Principal`]
//! - **Roles**: [`normalize_role`] gives every role id the canonical `roles/` prefix
//! - **Codec**: [`BindingMap`] is the `role -> principal -> type` form used to
//!   check and mutate bindings, one entry per (role, principal) pair
//! - **Errors**: [`IamError`] and the transport-facing [`BackendError`]
//!
//! # Quick Start
//!
//! ```
//! use iam_core::{BindingMap, MemberType, Policy, normalize_role};
//!
//! let policy = Policy::from_json_str(
//!     r#"{"bindings":[{"role_id":"roles/viewer","members":[{"member_id":"u1","member_type":"USER"}]}],"etag":"v1"}"#,
//! )?;
//!
//! let mut map = BindingMap::from_policy(&policy);
//! let role = normalize_role("viewer");
//! assert!(map.contains(&role, "u1"));
//!
//! map.insert(&role, "u2", MemberType::Group);
//! let updated = map.into_policy(policy.etag.clone());
//! assert_eq!(updated.bindings[0].members.len(), 2);
//! # Ok::<(), iam_core::IamError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod codec;
mod error;
mod role;
mod types;

pub use codec::*;
pub use error::*;
pub use role::*;
pub use types::*;

/// Hard backend limit on principal ids per batch lookup request.
pub const MAX_PRINCIPALS_PER_BATCH: usize = 1000;
