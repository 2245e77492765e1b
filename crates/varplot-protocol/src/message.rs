//! Small control messages exchanged around the payload.

use serde::{Deserialize, Serialize};

/// Message sent from the renderer to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum RendererMessage {
    /// The render loop accepts payloads. Sent exactly once per renderer load.
    Ready,
}

/// Reply of the debuggee-side extractor, after quote stripping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StagedPointer {
    /// The extractor failed, for example on an unsupported type.
    Failed {
        /// Extractor diagnostic.
        error: String,
    },
    /// The payload was written to a temporary file.
    Staged {
        /// Location of the staged payload.
        file_path: String,
    },
}
