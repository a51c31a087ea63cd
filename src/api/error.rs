use thiserror::Error;

/// Failures of the remote backends, already phrased for the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("{0}")]
    StartFailed(String),

    /// Carries the backend's detail when the response had one.
    #[error("{0}")]
    SubmitFailed(String),

    #[error("{0}")]
    ResultFetchFailed(String),

    /// Backend answered with neither a next question nor a completion marker.
    #[error("{0}")]
    MalformedResponse(String),

    /// Backend no longer knows the session; retrying cannot succeed.
    #[error("{0}")]
    SessionExpired(String),

    #[error("{0}")]
    RecommendationFailed(String),

    #[error("{0}")]
    EndSessionFailed(String),
}

impl ApiError {
    pub fn message(&self) -> &str {
        match self {
            ApiError::StartFailed(msg)
            | ApiError::SubmitFailed(msg)
            | ApiError::ResultFetchFailed(msg)
            | ApiError::MalformedResponse(msg)
            | ApiError::SessionExpired(msg)
            | ApiError::RecommendationFailed(msg)
            | ApiError::EndSessionFailed(msg) => msg,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired(_))
    }

    /// Build the expiry error shown to the user from the backend's detail.
    pub(crate) fn expired(detail: &str) -> Self {
        ApiError::SessionExpired(format!(
            "Session expired or not found ({}). The backend may have restarted; please start the assessment again.",
            detail.trim()
        ))
    }
}

const EXPIRY_MARKERS: [&str; 3] = ["session", "expired", "not found"];

/// The backend has no typed error code for a lost session, so infer it from
/// a 404 status or the wording of the failure text.
pub fn indicates_expired_session(status: Option<u16>, message: &str) -> bool {
    let message = message.to_lowercase();
    status == Some(404) || EXPIRY_MARKERS.iter().any(|marker| message.contains(marker))
}
