use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanvasError {
    /// A canvases API call failed. `status` is absent when no HTTP response
    /// was received at all.
    #[error("{message}")]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// No response: connection, DNS, or TLS failure.
    Transport,
    /// 401 or 403.
    Unauthorized,
    /// 404.
    NotFound,
    /// Any other non-success status outside 5xx (other 4xx, 1xx, unfollowed 3xx).
    Rejected,
    /// 5xx.
    Server,
    /// A success status whose body could not be decoded.
    Decode,
}

impl CanvasError {
    pub fn request_failed(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }

    /// HTTP status of a failed request, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// The human-readable failure message.
    pub fn message(&self) -> String {
        match self {
            Self::RequestFailed { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn category(&self) -> Option<FailureCategory> {
        let Self::RequestFailed { status, .. } = self else {
            return None;
        };
        Some(match status {
            None => FailureCategory::Transport,
            Some(401 | 403) => FailureCategory::Unauthorized,
            Some(404) => FailureCategory::NotFound,
            Some(200..=299) => FailureCategory::Decode,
            Some(500..=599) => FailureCategory::Server,
            Some(_) => FailureCategory::Rejected,
        })
    }

    pub fn is_not_found(&self) -> bool {
        self.category() == Some(FailureCategory::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, CanvasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_bare_message() {
        let err = CanvasError::request_failed(Some(404), "Canvas not found");
        assert_eq!(err.to_string(), "Canvas not found");
        assert_eq!(err.message(), "Canvas not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_category_by_status() {
        let cat = |s| CanvasError::request_failed(s, "x").category();
        assert_eq!(cat(None), Some(FailureCategory::Transport));
        assert_eq!(cat(Some(401)), Some(FailureCategory::Unauthorized));
        assert_eq!(cat(Some(403)), Some(FailureCategory::Unauthorized));
        assert_eq!(cat(Some(404)), Some(FailureCategory::NotFound));
        assert_eq!(cat(Some(422)), Some(FailureCategory::Rejected));
        assert_eq!(cat(Some(502)), Some(FailureCategory::Server));
        // Undecodable success body
        assert_eq!(cat(Some(200)), Some(FailureCategory::Decode));
    }

    #[test]
    fn test_informational_and_redirect_statuses_are_rejections() {
        let cat = |s| CanvasError::request_failed(Some(s), "pick one").category();
        assert_eq!(cat(300), Some(FailureCategory::Rejected));
        assert_eq!(cat(304), Some(FailureCategory::Rejected));
        assert_eq!(cat(101), Some(FailureCategory::Rejected));
        assert_eq!(cat(204), Some(FailureCategory::Decode));
    }

    #[test]
    fn test_non_request_errors_have_no_category() {
        let err = CanvasError::Config("bad".into());
        assert_eq!(err.category(), None);
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "Config error: bad");
    }
}
