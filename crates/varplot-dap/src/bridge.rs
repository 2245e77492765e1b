//! Builds the remote extraction call and classifies its reply.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;
use varplot_config::Config;
use varplot_protocol::StagedPointer;

use crate::errors::BridgeError;
use crate::session::DebugSession;

const BRIDGE_TARGET: &str = "varplot_dap::bridge";

/// Outcome of a successful evaluate round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The payload was written to a staging file.
    Staged(Utf8PathBuf),
    /// The extractor reported a structured failure.
    Failed(String),
}

/// Ships the extractor to the debuggee and runs it on one expression.
#[derive(Debug, Clone)]
pub struct ExtractorBridge {
    encoded_script: String,
    entry: String,
    context: String,
}

impl ExtractorBridge {
    /// Builds a bridge from extractor source text.
    #[must_use]
    pub fn new(script: &str, entry: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            encoded_script: STANDARD.encode(script),
            entry: entry.into(),
            context: context.into(),
        }
    }

    /// Builds a bridge from the configured script path.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MissingScript`] when no script is configured and
    /// [`BridgeError::ScriptUnreadable`] when it cannot be read.
    pub fn from_config(config: &Config) -> Result<Self, BridgeError> {
        let path = config
            .extractor_script
            .as_deref()
            .ok_or(BridgeError::MissingScript)?;
        let script = read_script(path)?;
        Ok(Self::new(
            &script,
            config.extractor_entry.as_str(),
            config.evaluate_context.as_str(),
        ))
    }

    /// The one-line expression that defines and invokes the extractor.
    #[must_use]
    pub fn call_expression(&self, expression: &str) -> String {
        format!(
            "[exec(__import__('base64').b64decode('{}').decode('utf-8')), {}({})][-1]",
            self.encoded_script, self.entry, expression
        )
    }

    /// Runs the extractor for `expression` in `frame_id`.
    ///
    /// Blocks until the debuggee responds.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Session`] when the evaluate call fails and
    /// [`BridgeError::MalformedPointer`] when the reply is not a pointer.
    pub fn extract<S>(
        &self,
        session: &S,
        expression: &str,
        frame_id: Option<i64>,
    ) -> Result<Extraction, BridgeError>
    where
        S: DebugSession + ?Sized,
    {
        debug!(target: BRIDGE_TARGET, expression, ?frame_id, "evaluating extractor");
        let reply = session.evaluate(&self.call_expression(expression), frame_id, &self.context)?;
        classify_reply(&reply)
    }
}

fn read_script(path: &Utf8Path) -> Result<String, BridgeError> {
    std::fs::read_to_string(path).map_err(|source| BridgeError::ScriptUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Removes one layer of matching `'` or `"` quotes.
///
/// Debug adapters report string results in their `repr` form, so the JSON
/// pointer arrives wrapped in quotes.
#[must_use]
pub fn strip_quotes(raw: &str) -> &str {
    ['\'', '"']
        .into_iter()
        .find_map(|quote| {
            raw.strip_prefix(quote)
                .and_then(|inner| inner.strip_suffix(quote))
        })
        .unwrap_or(raw)
}

/// Parses an extractor reply into an [`Extraction`].
///
/// # Errors
///
/// Returns [`BridgeError::MalformedPointer`] carrying the stripped text when
/// it is not a pointer object.
pub fn classify_reply(reply: &str) -> Result<Extraction, BridgeError> {
    let raw = strip_quotes(reply);
    let pointer: StagedPointer =
        serde_json::from_str(raw).map_err(|source| BridgeError::MalformedPointer {
            raw: raw.to_owned(),
            source,
        })?;
    Ok(match pointer {
        StagedPointer::Failed { error } => Extraction::Failed(error),
        StagedPointer::Staged { file_path } => Extraction::Staged(Utf8PathBuf::from(file_path)),
    })
}
