//! Failure logging for canvas requests.

use tracing::error;

use canvas_core::CanvasError;

use crate::Operation;

/// Receives every failed request exactly once, before the error is returned
/// to the caller.
pub trait FailureLogger: Send + Sync {
    fn request_failed(&self, operation: &Operation<'_>, error: &CanvasError);
}

/// Emits a `tracing` error event per failure.
pub struct TracingLogger;

impl FailureLogger for TracingLogger {
    fn request_failed(&self, operation: &Operation<'_>, err: &CanvasError) {
        error!(
            operation = operation.name(),
            canvas_id = operation.canvas_id().unwrap_or("-"),
            status = ?err.status(),
            detail = %err,
            "{}",
            operation.describe()
        );
    }
}

/// Discards failures.
pub struct SilentLogger;

impl FailureLogger for SilentLogger {
    fn request_failed(&self, _operation: &Operation<'_>, _error: &CanvasError) {}
}
