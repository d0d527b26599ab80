//! Policy documents and resolved principals.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{IamError, IamResult};

/// Access-control policy attached to a single resource.
///
/// `etag` is the opaque version token the backend uses for compare-and-swap.
/// An empty token means "unknown"; [`Policy::has_etag`] reports it.
///
/// Deserializing this type directly ignores unknown fields, which is what
/// backend responses need. Caller-authored documents go through
/// [`Policy::from_json_str`], which rejects them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Role bindings. Order carries no meaning.
    #[serde(default)]
    pub bindings: Vec<Binding>,

    /// Version token.
    #[serde(default)]
    pub etag: String,
}

impl Policy {
    /// Create a policy from bindings and a version token.
    #[must_use]
    pub fn new(bindings: Vec<Binding>, etag: impl Into<String>) -> Self {
        Self {
            bindings,
            etag: etag.into(),
        }
    }

    /// Returns true if the policy carries a version token.
    #[must_use]
    pub fn has_etag(&self) -> bool {
        !self.etag.is_empty()
    }

    /// Number of (role, member) entries across all bindings.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.bindings.iter().map(|b| b.members.len()).sum()
    }

    /// Decode a caller-authored policy document.
    ///
    /// Unknown fields are rejected. A literal `null` document is the nil
    /// policy and yields [`IamError::NilPolicy`].
    ///
    /// # Errors
    /// Returns [`IamError::InvalidPolicyDocument`] if the JSON does not match
    /// the policy shape, or [`IamError::NilPolicy`] for `null`.
    pub fn from_json_str(document: &str) -> IamResult<Self> {
        Self::from_json_slice(document.as_bytes())
    }

    /// Byte-slice variant of [`Policy::from_json_str`].
    ///
    /// # Errors
    /// See [`Policy::from_json_str`].
    pub fn from_json_slice(document: &[u8]) -> IamResult<Self> {
        let parsed: Option<PolicyDocument> = serde_json::from_slice(document)
            .map_err(|e| IamError::InvalidPolicyDocument(e.to_string()))?;
        parsed.map(Self::from).ok_or(IamError::NilPolicy)
    }
}

// Strict mirrors of the policy shape for caller-authored documents.

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyDocument {
    #[serde(default)]
    bindings: Vec<BindingDocument>,
    #[serde(default)]
    etag: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BindingDocument {
    role_id: String,
    #[serde(default)]
    members: Vec<MemberDocument>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MemberDocument {
    member_id: String,
    member_type: MemberType,
}

impl From<PolicyDocument> for Policy {
    fn from(doc: PolicyDocument) -> Self {
        let bindings = doc
            .bindings
            .into_iter()
            .map(|b| {
                let members = b
                    .members
                    .into_iter()
                    .map(|m| Member::new(m.member_id, m.member_type))
                    .collect();
                Binding::new(b.role_id, members)
            })
            .collect();
        Self::new(bindings, doc.etag)
    }
}

/// A role paired with the members it is granted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Role identifier, e.g. `roles/viewer`.
    pub role_id: String,

    /// Members holding the role.
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Binding {
    /// Create a binding.
    #[must_use]
    pub fn new(role_id: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            role_id: role_id.into(),
            members,
        }
    }
}

/// A principal reference inside a binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    /// Opaque principal id.
    pub member_id: String,

    /// Principal type as reported by the identity system.
    pub member_type: MemberType,
}

impl Member {
    /// Create a member.
    #[must_use]
    pub fn new(member_id: impl Into<String>, member_type: MemberType) -> Self {
        Self {
            member_id: member_id.into(),
            member_type,
        }
    }
}

/// Type of a policy member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberType {
    /// Human user.
    User,
    /// Group of principals.
    Group,
    /// Service principal (machine identity).
    ServicePrincipal,
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "USER"),
            Self::Group => write!(f, "GROUP"),
            Self::ServicePrincipal => write!(f, "SERVICE_PRINCIPAL"),
        }
    }
}

/// Detail level requested from the principal service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrincipalView {
    /// Id and type only.
    #[default]
    Basic,
    /// Id, type and display name.
    Full,
}

impl fmt::Display for PrincipalView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => write!(f, "BASIC"),
            Self::Full => write!(f, "FULL"),
        }
    }
}

/// Identity record resolved from a principal id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Principal id.
    pub id: String,

    /// Type and type-specific display name.
    pub kind: PrincipalKind,
}

/// Principal type with its display name.
///
/// Names are `None` when the lookup used [`PrincipalView::Basic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrincipalKind {
    /// Human user.
    User {
        /// Full name of the user.
        full_name: Option<String>,
    },
    /// Group of principals.
    Group {
        /// Group display name.
        display_name: Option<String>,
    },
    /// Service principal.
    Service {
        /// Service name.
        name: Option<String>,
    },
    /// The identity system did not classify the principal.
    Unspecified,
}

impl Principal {
    /// Create a user principal.
    #[must_use]
    pub fn user(id: impl Into<String>, full_name: Option<String>) -> Self {
        Self {
            id: id.into(),
            kind: PrincipalKind::User { full_name },
        }
    }

    /// Create a group principal.
    #[must_use]
    pub fn group(id: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            id: id.into(),
            kind: PrincipalKind::Group { display_name },
        }
    }

    /// Create a service principal.
    #[must_use]
    pub fn service(id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            kind: PrincipalKind::Service { name },
        }
    }

    /// Create an unclassified principal.
    #[must_use]
    pub fn unspecified(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: PrincipalKind::Unspecified,
        }
    }

    /// Member type for this principal.
    ///
    /// # Errors
    /// Returns [`IamError::UnspecifiedPrincipalType`] for an unclassified principal.
    pub fn member_type(&self) -> IamResult<MemberType> {
        match self.kind {
            PrincipalKind::User { .. } => Ok(MemberType::User),
            PrincipalKind::Group { .. } => Ok(MemberType::Group),
            PrincipalKind::Service { .. } => Ok(MemberType::ServicePrincipal),
            PrincipalKind::Unspecified => Err(IamError::UnspecifiedPrincipalType {
                principal_id: self.id.clone(),
            }),
        }
    }

    /// Type-specific display name, if one was returned.
    ///
    /// # Errors
    /// Returns [`IamError::UnspecifiedPrincipalType`] for an unclassified principal.
    pub fn display_name(&self) -> IamResult<Option<&str>> {
        match &self.kind {
            PrincipalKind::User { full_name } => Ok(full_name.as_deref()),
            PrincipalKind::Group { display_name } => Ok(display_name.as_deref()),
            PrincipalKind::Service { name } => Ok(name.as_deref()),
            PrincipalKind::Unspecified => Err(IamError::UnspecifiedPrincipalType {
                principal_id: self.id.clone(),
            }),
        }
    }
}
