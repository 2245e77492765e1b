use crate::endpoint::AdapterEndpoint;

/// Port `debugpy` listens on unless told otherwise.
pub const DEFAULT_ADAPTER_PORT: u16 = 5678;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Evaluate context that lets the adapter run statements with side effects.
pub const DEFAULT_EVALUATE_CONTEXT: &str = "repl";

/// Entry point the extractor script is expected to define.
pub const DEFAULT_EXTRACTOR_ENTRY: &str = "_varplot_extract_data";

/// Seconds to wait for a single debug adapter round trip.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default surface width in pixels.
pub const DEFAULT_PANEL_WIDTH: u32 = 800;

/// Default surface height in pixels.
pub const DEFAULT_PANEL_HEIGHT: u32 = 600;

/// Point count at which point clouds switch to the high-throughput trace.
pub const DEFAULT_POINT_GL_THRESHOLD: usize = 5000;

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Default debug adapter endpoint on the loopback interface.
#[must_use]
pub fn default_adapter_endpoint() -> AdapterEndpoint {
    AdapterEndpoint::tcp("127.0.0.1", DEFAULT_ADAPTER_PORT)
}

/// Owned default evaluate context.
#[must_use]
pub fn default_evaluate_context() -> String {
    DEFAULT_EVALUATE_CONTEXT.to_owned()
}

/// Owned default extractor entry point.
#[must_use]
pub fn default_extractor_entry() -> String {
    DEFAULT_EXTRACTOR_ENTRY.to_owned()
}
