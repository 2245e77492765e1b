//! User-facing notices for explicit actions.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use tracing::warn;

const NOTIFIER_TARGET: &str = "varplot_host::notifier";

/// Shows blocking notices to the user.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    /// Shows an error notice.
    fn error(&self, message: &str);
}

/// [`Notifier`] that writes one line per notice to a writer.
#[derive(Debug)]
pub struct WriterNotifier<W> {
    writer: Mutex<W>,
}

impl<W: Write> WriterNotifier<W> {
    /// Wraps `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the wrapped writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write> Notifier for WriterNotifier<W> {
    fn error(&self, message: &str) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(error) = writeln!(writer, "{message}") {
            warn!(target: NOTIFIER_TARGET, %error, notice = message, "failed to show notice");
        }
    }
}
