//! HTTP client for the canvases API.
//!
//! [`CanvasClient`] maps each canvas operation onto one request against
//! `{base_url}/api/v1/canvases/...`, attaches a bearer token when its
//! [`TokenProvider`] has one, and normalizes every failure into
//! [`CanvasError::RequestFailed`](canvas_core::CanvasError::RequestFailed).

pub mod auth;
pub mod client;
pub mod logging;

pub use auth::{EnvToken, NoToken, StaticToken, TokenProvider};
pub use client::CanvasClient;
pub use logging::{FailureLogger, SilentLogger, TracingLogger};

/// A canvas API call, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    GetCanvas { id: &'a str },
    ListCanvases,
    CreateCanvas,
    UpdateCanvas { id: &'a str },
    DeleteCanvas { id: &'a str },
    ProcessContent { id: &'a str },
}

impl Operation<'_> {
    /// Stable identifier for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetCanvas { .. } => "get_canvas_by_id",
            Self::ListCanvases => "get_canvases",
            Self::CreateCanvas => "create_canvas",
            Self::UpdateCanvas { .. } => "update_canvas_by_id",
            Self::DeleteCanvas { .. } => "delete_canvas_by_id",
            Self::ProcessContent { .. } => "process_canvas_content",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::GetCanvas { .. } => "Error fetching canvas by ID",
            Self::ListCanvases => "Error fetching canvases",
            Self::CreateCanvas => "Error creating canvas",
            Self::UpdateCanvas { .. } => "Error updating canvas by ID",
            Self::DeleteCanvas { .. } => "Error deleting canvas by ID",
            Self::ProcessContent { .. } => "Error processing canvas content",
        }
    }

    pub fn canvas_id(&self) -> Option<&str> {
        match self {
            Self::GetCanvas { id }
            | Self::UpdateCanvas { id }
            | Self::DeleteCanvas { id }
            | Self::ProcessContent { id } => Some(id),
            Self::ListCanvases | Self::CreateCanvas => None,
        }
    }

    /// Message used when the error body is JSON but carries no usable `detail`.
    pub fn fallback_message(&self) -> String {
        match self {
            Self::GetCanvas { id } => format!("Failed to fetch canvas {id}"),
            Self::ListCanvases => "Failed to fetch canvases".into(),
            Self::CreateCanvas => "Failed to create canvas".into(),
            Self::UpdateCanvas { id } => format!("Failed to update canvas {id}"),
            Self::DeleteCanvas { id } => format!("Failed to delete canvas {id}"),
            Self::ProcessContent { .. } => "Failed to process canvas content".into(),
        }
    }

    /// Fixed message for an unparseable error body, overriding the status text.
    pub(crate) fn unparseable_body_message(&self) -> Option<&'static str> {
        match self {
            Self::ProcessContent { .. } => {
                Some("Failed to process canvas content and parse error")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_messages_name_the_canvas() {
        assert_eq!(
            Operation::GetCanvas { id: "c1" }.fallback_message(),
            "Failed to fetch canvas c1"
        );
        assert_eq!(
            Operation::DeleteCanvas { id: "c2" }.fallback_message(),
            "Failed to delete canvas c2"
        );
        assert_eq!(Operation::ListCanvases.fallback_message(), "Failed to fetch canvases");
    }

    #[test]
    fn test_canvas_id() {
        assert_eq!(Operation::UpdateCanvas { id: "x" }.canvas_id(), Some("x"));
        assert_eq!(Operation::CreateCanvas.canvas_id(), None);
        assert_eq!(Operation::ProcessContent { id: "p" }.name(), "process_canvas_content");
    }
}
