//! The debug-session seam used by the extractor bridge and the host.

use crate::errors::ClientError;

/// Operations the host needs from a paused debug session.
///
/// [`crate::DapClient`] implements this over a live adapter connection; tests
/// substitute a mock.
pub trait DebugSession: Send + Sync {
    /// Identifier of the frame the user is paused in.
    ///
    /// Returns `Ok(None)` when no thread is stopped.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the adapter cannot be queried.
    fn top_frame_id(&self) -> Result<Option<i64>, ClientError>;

    /// Evaluates `expression` in the given frame and returns the result text.
    ///
    /// Blocks until the debuggee answers.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails or the adapter reports
    /// an evaluation error.
    fn evaluate(
        &self,
        expression: &str,
        frame_id: Option<i64>,
        context: &str,
    ) -> Result<String, ClientError>;
}
