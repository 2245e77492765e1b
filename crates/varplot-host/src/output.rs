//! Writing rendered frames: the figure snapshot and the image viewport.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Value, json};
use tracing::info;
use varplot_render::Frame;

use crate::errors::AppError;

const OUTPUT_TARGET: &str = "varplot_host::output";

/// The JSON document written for a frame.
#[must_use]
pub fn frame_document(frame: &Frame) -> Value {
    json!({
        "status": frame.status,
        "state": frame.state,
        "tooltip": frame.tooltip,
        "figure": frame.snapshot,
    })
}

/// Path of the viewport PNG written next to `output`.
#[must_use]
pub fn viewport_path(output: &Utf8Path) -> Utf8PathBuf {
    output.with_extension("png")
}

/// Writes `frame` to `output`, or to `stdout` when no path is given.
///
/// With a path, image frames also get a PNG of the visible viewport next to
/// the snapshot.
///
/// # Errors
///
/// Returns [`AppError::Output`] when a file or `stdout` cannot be written and
/// [`AppError::Image`] when the PNG cannot be encoded.
pub fn write_frame<W: Write>(
    frame: &Frame,
    output: Option<&Utf8Path>,
    stdout: &mut W,
) -> Result<(), AppError> {
    let document = frame_document(frame);
    let Some(path) = output else {
        return writeln!(stdout, "{document}").map_err(|source| AppError::Output {
            path: Utf8PathBuf::from("<stdout>"),
            source,
        });
    };

    let mut text = serde_json::to_string_pretty(&document).map_err(|error| AppError::Output {
        path: path.to_path_buf(),
        source: error.into(),
    })?;
    text.push('\n');
    std::fs::write(path, text).map_err(|source| AppError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    info!(target: OUTPUT_TARGET, %path, status = %frame.status, "wrote figure snapshot");

    if let Some(viewport) = frame.viewport.as_ref() {
        let png = viewport_path(path);
        viewport.save(&png).map_err(|source| AppError::Image {
            path: png.clone(),
            source,
        })?;
        info!(target: OUTPUT_TARGET, path = %png, "wrote viewport image");
    }
    Ok(())
}
