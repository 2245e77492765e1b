//! Debug Adapter Protocol message envelopes and the bodies this client uses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request sent to the adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DapRequest {
    /// Sequence number of this message.
    pub seq: i64,
    /// Command name, e.g. `evaluate`.
    pub command: String,
    /// Command arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

/// A response from the adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DapResponse {
    /// Sequence number of this message.
    pub seq: i64,
    /// Sequence number of the answered request.
    pub request_seq: i64,
    /// Whether the request succeeded.
    pub success: bool,
    /// Command name echoed from the request.
    pub command: String,
    /// Short failure reason or error text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Command result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl DapResponse {
    /// Human-readable failure text, preferring the structured error body.
    #[must_use]
    pub fn failure_message(&self) -> String {
        let formatted = self
            .body
            .as_ref()
            .and_then(|body| body.get("error"))
            .and_then(|error| error.get("format"))
            .and_then(Value::as_str);
        formatted
            .or(self.message.as_deref())
            .unwrap_or("unknown error")
            .to_owned()
    }
}

/// An event pushed by the adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DapEvent {
    /// Sequence number of this message.
    pub seq: i64,
    /// Event name, e.g. `stopped`.
    pub event: String,
    /// Event details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl DapEvent {
    /// Thread reported by a `stopped` event.
    #[must_use]
    pub fn stopped_thread(&self) -> Option<i64> {
        if self.event != "stopped" {
            return None;
        }
        self.body
            .as_ref()
            .and_then(|body| body.get("threadId"))
            .and_then(Value::as_i64)
    }

    /// Whether the event ends the debug session.
    #[must_use]
    pub fn ends_session(&self) -> bool {
        matches!(self.event.as_str(), "terminated" | "exited")
    }
}

/// Any message on the wire, discriminated by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DapMessage {
    /// Request, including reverse requests from the adapter.
    Request(DapRequest),
    /// Response to a request.
    Response(DapResponse),
    /// Asynchronous event.
    Event(DapEvent),
}

impl DapMessage {
    /// Parses a message from a framed body.
    ///
    /// # Errors
    ///
    /// Returns the serde error if the bytes are not a DAP message.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Arguments of the `evaluate` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateArguments<'a> {
    /// Expression to evaluate.
    pub expression: &'a str,
    /// Frame providing the evaluation scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<i64>,
    /// Context such as `repl`, `watch` or `hover`.
    pub context: &'a str,
}

/// Body of a successful `evaluate` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateBody {
    /// Result rendered as text by the adapter.
    pub result: String,
    /// Type name of the result, when reported.
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    /// Handle for structured children, zero when none.
    #[serde(default)]
    pub variables_reference: i64,
}

/// A debuggee thread.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Thread {
    /// Thread identifier.
    pub id: i64,
    /// Thread name.
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThreadsBody {
    pub(crate) threads: Vec<Thread>,
}

/// Arguments of the `stackTrace` request.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StackTraceArguments {
    pub(crate) thread_id: i64,
    pub(crate) start_frame: i64,
    pub(crate) levels: i64,
}

/// A stack frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StackFrame {
    /// Frame identifier used as evaluation scope.
    pub id: i64,
    /// Function or scope name.
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StackTraceBody {
    pub(crate) stack_frames: Vec<StackFrame>,
}
