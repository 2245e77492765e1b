//! Single-use file hand-off between the extractor and the host.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};
use varplot_protocol::Payload;

use crate::errors::StagingError;

const STAGING_TARGET: &str = "varplot_dap::staging";

/// Deletes the staged file when dropped, whatever happened in between.
#[derive(Debug)]
struct StagedFile {
    path: Utf8PathBuf,
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(target: STAGING_TARGET, path = %self.path, "deleted staged payload"),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => warn!(
                target: STAGING_TARGET,
                path = %self.path,
                %error,
                "failed to delete staged payload"
            ),
        }
    }
}

/// Reader side of the staging discipline.
///
/// Each staged file is read once and removed on every exit path. Deletion
/// failures are logged and never escalated.
#[derive(Debug, Clone, Copy, Default)]
pub struct StagingStore;

impl StagingStore {
    /// Reads the payload at `path` and deletes the file.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::Read`] when the file cannot be read and
    /// [`StagingError::Parse`] (with the raw contents) when it is not a
    /// payload. The file is deleted in both cases.
    pub fn read_and_delete(self, path: &Utf8Path) -> Result<Payload, StagingError> {
        let _guard = StagedFile {
            path: path.to_path_buf(),
        };
        let raw = std::fs::read_to_string(path).map_err(|source| StagingError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Payload::from_json_str(&raw).map_err(|source| StagingError::Parse { raw, source })
    }
}
