//! IAM error types.

/// Errors reported by a policy backend or the principal service.
///
/// Transports map their failures onto these variants; the engine passes them
/// through unchanged in kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The resource (or organization) does not exist.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The supplied version token is stale.
    #[error("Policy version mismatch: {0}")]
    VersionMismatch(String),

    /// The caller may not read or write this policy.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Non-success response from the backend.
    #[error("Backend error {status}: {message}")]
    Api {
        /// HTTP (or equivalent) status code.
        status: u16,
        /// Response body or message.
        message: String,
    },

    /// The request never produced a usable response.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// IAM engine errors.
#[derive(Debug, thiserror::Error)]
pub enum IamError {
    /// No policy was supplied.
    #[error("nil policy supplied")]
    NilPolicy,

    /// The policy document could not be decoded.
    #[error("Invalid policy document: {0}")]
    InvalidPolicyDocument(String),

    /// The principal already holds the role.
    #[error("principal {principal_id} is already bound to role {role_id}")]
    AlreadyBound {
        /// Principal id.
        principal_id: String,
        /// Normalized role id.
        role_id: String,
    },

    /// The principal does not hold the role.
    #[error("binding for principal {principal_id} and role {role_id} does not exist")]
    NotBound {
        /// Principal id.
        principal_id: String,
        /// Normalized role id.
        role_id: String,
    },

    /// The principal could not be classified.
    #[error("failed to resolve principal {principal_id}: {reason}")]
    PrincipalResolution {
        /// Principal id.
        principal_id: String,
        /// What went wrong.
        reason: String,
    },

    /// The identity system returned a principal without a type.
    #[error("principal {principal_id} has an unspecified type")]
    UnspecifiedPrincipalType {
        /// Principal id.
        principal_id: String,
    },

    /// A backend call failed.
    #[error("{context}: {source}")]
    Backend {
        /// Which step failed, e.g. "failed to retrieve existing policy".
        context: String,
        /// Underlying backend error.
        #[source]
        source: BackendError,
    },

    /// The operation was cancelled or its deadline elapsed.
    #[error("operation cancelled: {0}")]
    Cancelled(String),
}

/// Result type for IAM operations.
pub type IamResult<T> = Result<T, IamError>;

impl IamError {
    /// Wrap a backend error with the step that produced it.
    #[must_use]
    pub fn backend(context: impl Into<String>, source: BackendError) -> Self {
        Self::Backend {
            context: context.into(),
            source,
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NilPolicy => "IAM_NIL_POLICY",
            Self::InvalidPolicyDocument(_) => "IAM_INVALID_POLICY_DOCUMENT",
            Self::AlreadyBound { .. } => "IAM_ALREADY_BOUND",
            Self::NotBound { .. } => "IAM_NOT_BOUND",
            Self::PrincipalResolution { .. } => "IAM_PRINCIPAL_RESOLUTION_FAILED",
            Self::UnspecifiedPrincipalType { .. } => "IAM_UNSPECIFIED_PRINCIPAL_TYPE",
            Self::Backend { source, .. } => match source {
                BackendError::NotFound(_) => "IAM_BACKEND_NOT_FOUND",
                BackendError::VersionMismatch(_) => "IAM_BACKEND_VERSION_MISMATCH",
                BackendError::PermissionDenied(_) => "IAM_BACKEND_PERMISSION_DENIED",
                BackendError::Api { .. } => "IAM_BACKEND_API",
                BackendError::Transport(_) => "IAM_BACKEND_TRANSPORT",
            },
            Self::Cancelled(_) => "IAM_CANCELLED",
        }
    }

    /// Returns the backend error, if this is a backend failure.
    #[must_use]
    pub const fn backend_error(&self) -> Option<&BackendError> {
        match self {
            Self::Backend { source, .. } => Some(source),
            _ => None,
        }
    }

    /// True for local user/state conflicts detected from the fetched policy.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::NilPolicy | Self::AlreadyBound { .. } | Self::NotBound { .. }
        )
    }

    /// True if the backend rejected a stale version token.
    #[must_use]
    pub const fn is_version_mismatch(&self) -> bool {
        matches!(
            self,
            Self::Backend {
                source: BackendError::VersionMismatch(_),
                ..
            }
        )
    }
}
