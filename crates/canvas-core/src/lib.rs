//! Canvas record types, config, and errors shared by the canvases API client.

pub mod config;
pub mod error;
pub mod types;

pub use error::{CanvasError, FailureCategory, Result};
pub use types::{
    Canvas, CanvasContent, CanvasData, CanvasFormData, ProcessCommand, ProcessContentRequest,
    ProcessedContent,
};
