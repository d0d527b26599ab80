//! Transport error types and status mapping.

use iam_core::BackendError;
use reqwest::StatusCode;

/// Errors building the HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    /// Invalid client configuration.
    #[error("Invalid IAM client configuration: {0}")]
    InvalidConfig(String),

    /// URL parsing failed.
    #[error("URL parsing failed: {0}")]
    UrlError(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Result type for client construction.
pub type HttpClientResult<T> = Result<T, HttpClientError>;

/// Map a non-success response onto a backend error.
pub(crate) fn status_error(status: StatusCode, body: String) -> BackendError {
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    } else {
        body
    };

    match status {
        StatusCode::NOT_FOUND => BackendError::NotFound(message),
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
            BackendError::VersionMismatch(message)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::PermissionDenied(message),
        _ => BackendError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Map a request that produced no usable response.
pub(crate) fn transport_error(err: &reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Transport(format!("request timed out: {err}"))
    } else if err.is_decode() {
        BackendError::Transport(format!("invalid response body: {err}"))
    } else {
        BackendError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found() {
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, "no such project".into()),
            BackendError::NotFound("no such project".into())
        );
    }

    #[test]
    fn conflict_and_precondition_are_version_mismatch() {
        assert!(matches!(
            status_error(StatusCode::CONFLICT, "stale etag".into()),
            BackendError::VersionMismatch(_)
        ));
        assert!(matches!(
            status_error(StatusCode::PRECONDITION_FAILED, String::new()),
            BackendError::VersionMismatch(_)
        ));
    }

    #[test]
    fn auth_failures_are_permission_denied() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, String::new()),
            BackendError::PermissionDenied(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, String::new()),
            BackendError::PermissionDenied(_)
        ));
    }

    #[test]
    fn empty_body_uses_reason_phrase() {
        assert_eq!(
            status_error(StatusCode::BAD_GATEWAY, "  ".into()),
            BackendError::Api {
                status: 502,
                message: "Bad Gateway".into(),
            }
        );
    }

    #[test]
    fn invalid_config_display() {
        let e = HttpClientError::InvalidConfig("bad".into());
        assert_eq!(e.to_string(), "Invalid IAM client configuration: bad");
    }
}
