//! Error types for the debug adapter client, extractor bridge and staging store.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;
use varplot_protocol::PayloadError;

/// Transport-layer errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The adapter socket could not be opened.
    #[error("failed to connect to debug adapter at {endpoint}: {source}")]
    Connect {
        /// Endpoint that was dialled.
        endpoint: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Missing Content-Length header.
    #[error("missing Content-Length header")]
    MissingContentLength,

    /// Invalid header format.
    #[error("invalid header format")]
    InvalidHeader,
}

impl TransportError {
    /// Whether the error is a read deadline expiring.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Io(error)
                if matches!(error.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
        )
    }
}

/// Errors raised while talking to the debug adapter.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// JSON serialisation or deserialisation failed.
    #[error("DAP codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The adapter answered `success: false`.
    #[error("{command} failed: {message}")]
    RequestFailed {
        /// Command that failed.
        command: String,
        /// Adapter diagnostic.
        message: String,
    },

    /// A successful response carried no body where one is required.
    #[error("{command} response has no body")]
    MissingBody {
        /// Command whose response was empty.
        command: String,
    },

    /// No response arrived within the configured deadline.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// The timeout duration in seconds.
        timeout_secs: u64,
    },

    /// Too many unrelated messages arrived before the response.
    #[error("no response for request {request_seq} after {iterations} messages")]
    MaxResponseIterations {
        /// Sequence number of the unanswered request.
        request_seq: i64,
        /// Number of messages consumed while waiting.
        iterations: usize,
    },

    /// The debug session has terminated.
    #[error("debug session terminated")]
    SessionEnded,
}

/// Failures of a single extraction round trip.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The evaluate request itself failed.
    #[error(transparent)]
    Session(#[from] ClientError),

    /// The extractor reply was not a valid pointer.
    #[error("Parse Error: {source}. Raw output: {raw}")]
    MalformedPointer {
        /// Reply text after quote stripping.
        raw: String,
        /// The JSON parser failure.
        #[source]
        source: serde_json::Error,
    },

    /// The extractor script could not be read.
    #[error("failed to read extractor script {path}: {source}")]
    ScriptUnreadable {
        /// Configured script path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// No extractor script was configured.
    #[error("no extractor script configured (set extractor_script)")]
    MissingScript,
}

/// Failures reading a staged payload.
#[derive(Debug, Error)]
pub enum StagingError {
    /// The staged file could not be read.
    #[error("failed to read staged payload {path}: {source}")]
    Read {
        /// Staging file path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The staged file did not hold a payload.
    #[error("Parse Error: {source}. Raw output: {raw}")]
    Parse {
        /// File contents.
        raw: String,
        /// The payload decoding failure.
        #[source]
        source: PayloadError,
    },
}
