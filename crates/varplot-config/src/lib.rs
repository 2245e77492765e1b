//! Shared configuration for the varplot host and renderer.
//!
//! Configuration is layered by `ortho_config`: built-in defaults, then a TOML
//! file (`--config-path` or `VARPLOT_CONFIG_PATH`), then `VARPLOT_*`
//! environment variables, then command-line flags. The resolved [`Config`]
//! tells the host how to reach the debug adapter, which extractor script to
//! ship to the debuggee, and how large the rendering surface is.

mod defaults;
mod endpoint;
mod logging;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_ADAPTER_PORT, DEFAULT_EVALUATE_CONTEXT, DEFAULT_EXTRACTOR_ENTRY, DEFAULT_LOG_FILTER,
    DEFAULT_PANEL_HEIGHT, DEFAULT_PANEL_WIDTH, DEFAULT_POINT_GL_THRESHOLD,
    DEFAULT_REQUEST_TIMEOUT_SECS, default_adapter_endpoint, default_evaluate_context,
    default_extractor_entry, default_log_filter, default_log_filter_string, default_log_format,
};
pub use endpoint::{AdapterEndpoint, EndpointParseError};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "VARPLOT")]
pub struct Config {
    /// Debug adapter endpoint (`tcp://host:port` or `unix:///path`).
    #[ortho_config(default = defaults::default_adapter_endpoint())]
    pub adapter: AdapterEndpoint,
    /// Tracing filter expression.
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// Debuggee-side extractor source shipped with every evaluate request.
    pub extractor_script: Option<Utf8PathBuf>,
    /// Function defined by the extractor script and called with the expression.
    #[ortho_config(default = defaults::default_extractor_entry())]
    pub extractor_entry: String,
    /// Evaluate context reported to the debug adapter.
    #[ortho_config(default = defaults::default_evaluate_context())]
    pub evaluate_context: String,
    /// Upper bound on a single debug adapter round trip.
    #[ortho_config(default = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
    /// Rendering surface width in pixels.
    #[ortho_config(default = DEFAULT_PANEL_WIDTH)]
    pub panel_width: u32,
    /// Rendering surface height in pixels.
    #[ortho_config(default = DEFAULT_PANEL_HEIGHT)]
    pub panel_height: u32,
    /// Point count from which point clouds use the high-throughput trace.
    #[ortho_config(default = DEFAULT_POINT_GL_THRESHOLD)]
    pub point_gl_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adapter: default_adapter_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            extractor_script: None,
            extractor_entry: default_extractor_entry(),
            evaluate_context: default_evaluate_context(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            panel_width: DEFAULT_PANEL_WIDTH,
            panel_height: DEFAULT_PANEL_HEIGHT,
            point_gl_threshold: DEFAULT_POINT_GL_THRESHOLD,
        }
    }
}

impl Config {
    /// Debug adapter endpoint.
    #[must_use]
    pub const fn adapter(&self) -> &AdapterEndpoint {
        &self.adapter
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Surface size as `(width, height)`.
    #[must_use]
    pub const fn panel_size(&self) -> (u32, u32) {
        (self.panel_width, self.panel_height)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn default_config_matches_documented_defaults() {
        let config = Config::default();

        assert_eq!(config.adapter(), &AdapterEndpoint::tcp("127.0.0.1", 5678));
        assert_eq!(config.log_filter(), "info");
        assert_eq!(config.log_format(), LogFormat::Json);
        assert_eq!(config.panel_size(), (800, 600));
        assert_eq!(config.point_gl_threshold, 5000);
        assert_eq!(config.evaluate_context, "repl");
        assert!(config.extractor_script.is_none());
    }
}
