//! Error types for the host controller and the `varplot` binary.

use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::OrthoError;
use thiserror::Error;
use varplot_dap::{BridgeError, ClientError};

use crate::telemetry::TelemetryError;

/// A payload could not be handed to the renderer.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The payload could not be serialised.
    #[error("failed to encode payload: {0}")]
    Encode(#[source] serde_json::Error),

    /// The renderer has gone away.
    #[error("renderer is no longer accepting payloads")]
    Disconnected,
}

/// Failures surfaced by the `varplot` binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Command-line usage was invalid.
    #[error(transparent)]
    CliUsage(#[from] clap::Error),

    /// Configuration could not be loaded.
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(#[source] Arc<OrthoError>),

    /// Telemetry could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The extractor script could not be prepared.
    #[error(transparent)]
    Extractor(#[from] BridgeError),

    /// The debug adapter could not be reached.
    #[error("failed to attach to the debug adapter: {0}")]
    Attach(#[source] ClientError),

    /// The renderer thread could not be started.
    #[error("failed to start the renderer: {0}")]
    Renderer(#[source] io::Error),

    /// A payload could not be delivered.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// The renderer produced no frame in time.
    #[error("renderer produced no frame within {timeout_secs}s")]
    RenderTimeout {
        /// Seconds waited.
        timeout_secs: u64,
    },

    /// An output file could not be written.
    #[error("failed to write {path}: {source}")]
    Output {
        /// Destination path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The viewport image could not be encoded.
    #[error("failed to write image {path}: {source}")]
    Image {
        /// Destination path.
        path: Utf8PathBuf,
        /// Underlying encoder error.
        #[source]
        source: image::ImageError,
    },

    /// Waiting for adapter events failed.
    #[error("lost the debug adapter: {0}")]
    Session(#[source] ClientError),
}
