//! Debug adapter plumbing for varplot.
//!
//! This crate turns an expression into a staged payload: it talks the Debug
//! Adapter Protocol over a framed socket ([`DapClient`]), ships the extractor
//! to the paused debuggee ([`ExtractorBridge`]) and consumes the single-use
//! staging file the extractor writes ([`StagingStore`]). The
//! [`DebugSession`] trait is the seam the host depends on.

mod bridge;
mod client;
mod errors;
pub mod message;
mod session;
mod staging;
mod transport;

pub use bridge::{Extraction, ExtractorBridge, classify_reply, strip_quotes};
pub use client::DapClient;
pub use errors::{BridgeError, ClientError, StagingError, TransportError};
pub use message::DapEvent;
pub use session::DebugSession;
pub use staging::StagingStore;
pub use transport::FramedTransport;
