//! Conversions between the wire policy and the normalized binding map.
//!
//! The wire form is an unordered list of bindings. The normalized form is
//! `role -> principal -> type`, which keeps exactly one entry per
//! (role, principal) pair and makes presence checks direct lookups.

use std::collections::BTreeMap;

use crate::{Binding, Member, MemberType, Policy};

/// Normalized `role -> principal -> type` view of a policy's bindings.
///
/// Roles with no members are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingMap {
    roles: BTreeMap<String, BTreeMap<String, MemberType>>,
}

impl BindingMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a policy's bindings.
    ///
    /// If the wire form repeats a (role, principal) pair the last one wins.
    #[must_use]
    pub fn from_policy(policy: &Policy) -> Self {
        let mut map = Self::new();
        for binding in &policy.bindings {
            for member in &binding.members {
                map.insert(&binding.role_id, &member.member_id, member.member_type);
            }
        }
        map
    }

    /// Rebuild a policy carrying `etag`.
    ///
    /// Roles and members come out sorted.
    #[must_use]
    pub fn into_policy(self, etag: impl Into<String>) -> Policy {
        let bindings = self
            .roles
            .into_iter()
            .map(|(role_id, members)| Binding {
                role_id,
                members: members
                    .into_iter()
                    .map(|(member_id, member_type)| Member {
                        member_id,
                        member_type,
                    })
                    .collect(),
            })
            .collect();

        Policy::new(bindings, etag)
    }

    /// Returns true if `principal_id` holds `role_id`.
    #[must_use]
    pub fn contains(&self, role_id: &str, principal_id: &str) -> bool {
        self.roles
            .get(role_id)
            .is_some_and(|members| members.contains_key(principal_id))
    }

    /// Type recorded for the pair, if present.
    #[must_use]
    pub fn member_type(&self, role_id: &str, principal_id: &str) -> Option<MemberType> {
        self.roles
            .get(role_id)
            .and_then(|members| members.get(principal_id).copied())
    }

    /// Insert or overwrite a pair. Returns the previous type, if any.
    pub fn insert(
        &mut self,
        role_id: &str,
        principal_id: &str,
        member_type: MemberType,
    ) -> Option<MemberType> {
        self.roles
            .entry(role_id.to_string())
            .or_default()
            .insert(principal_id.to_string(), member_type)
    }

    /// Remove a pair, dropping the role once it has no members.
    ///
    /// Returns the removed type, or `None` if the pair was absent.
    pub fn remove(&mut self, role_id: &str, principal_id: &str) -> Option<MemberType> {
        let members = self.roles.get_mut(role_id)?;
        let removed = members.remove(principal_id)?;
        if members.is_empty() {
            self.roles.remove(role_id);
        }
        Some(removed)
    }

    /// Returns true if the role has at least one member.
    #[must_use]
    pub fn has_role(&self, role_id: &str) -> bool {
        self.roles.contains_key(role_id)
    }

    /// Number of (role, principal) pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.values().map(BTreeMap::len).sum()
    }

    /// Returns true if there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Flatten a policy into the normalized form.
#[must_use]
pub fn to_map(policy: &Policy) -> BindingMap {
    BindingMap::from_policy(policy)
}

/// Rebuild a policy from the normalized form.
#[must_use]
pub fn from_map(etag: impl Into<String>, map: BindingMap) -> Policy {
    map.into_policy(etag)
}
