//! Ready handshake between the host and a renderer.
//!
//! A renderer may not accept payloads until it has announced itself with
//! `{"command": "ready"}`. Until then the controller keeps at most one payload
//! in its pending slot; a newer payload replaces the older one. Disposing the
//! controller drops the slot and the target together, so nothing is delivered
//! to a renderer that has gone away.

use crossbeam_channel::Sender;
use tracing::{debug, trace, warn};
use varplot_protocol::Payload;
use varplot_render::RendererInput;

use crate::errors::DeliveryError;

const HANDSHAKE_TARGET: &str = "varplot_host::handshake";

/// Receives payload JSON on behalf of a renderer.
#[cfg_attr(test, mockall::automock)]
pub trait DeliveryTarget: Send {
    /// Hands `payload` (serialised JSON) to the renderer.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] when the renderer is unreachable.
    fn deliver(&mut self, payload: String) -> Result<(), DeliveryError>;
}

/// [`DeliveryTarget`] backed by a renderer's input channel.
#[derive(Debug, Clone)]
pub struct ChannelTarget {
    sender: Sender<RendererInput>,
}

impl ChannelTarget {
    /// Wraps the renderer input `sender`.
    #[must_use]
    pub const fn new(sender: Sender<RendererInput>) -> Self {
        Self { sender }
    }
}

impl DeliveryTarget for ChannelTarget {
    fn deliver(&mut self, payload: String) -> Result<(), DeliveryError> {
        self.sender
            .send(RendererInput::Payload(payload))
            .map_err(|_| DeliveryError::Disconnected)
    }
}

/// Handshake phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandshakeState {
    /// No renderer attached.
    #[default]
    Uninitialized,
    /// Attached; waiting for the ready message.
    AwaitingReady,
    /// Payloads go straight to the renderer.
    Ready,
}

/// What happened to an offered payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Sent to the renderer.
    Delivered,
    /// Kept in the pending slot, replacing anything already there.
    Buffered,
}

/// Three-state handshake with a single-slot buffer.
#[derive(Debug)]
pub struct HandshakeController<T> {
    state: HandshakeState,
    target: Option<T>,
    pending: Option<String>,
}

impl<T> Default for HandshakeController<T> {
    fn default() -> Self {
        Self {
            state: HandshakeState::Uninitialized,
            target: None,
            pending: None,
        }
    }
}

impl<T: DeliveryTarget> HandshakeController<T> {
    /// Creates an unattached controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    #[must_use]
    pub const fn state(&self) -> HandshakeState {
        self.state
    }

    /// Whether a payload waits for the ready message.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Attaches a freshly loaded renderer and starts waiting for it.
    pub fn attach(&mut self, target: T) {
        self.target = Some(target);
        self.state = HandshakeState::AwaitingReady;
        debug!(target: HANDSHAKE_TARGET, "renderer attached");
    }

    /// Handles the renderer's ready message: delivers and clears the pending
    /// slot. Returns whether a payload went out.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] when the buffered payload cannot be sent.
    pub fn on_ready(&mut self) -> Result<bool, DeliveryError> {
        self.state = HandshakeState::Ready;
        debug!(target: HANDSHAKE_TARGET, pending = self.pending.is_some(), "renderer ready");
        let Some(payload) = self.pending.take() else {
            return Ok(false);
        };
        self.send(payload)?;
        Ok(true)
    }

    /// Offers a payload: delivered when ready, buffered otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Encode`] when the payload cannot be
    /// serialised and [`DeliveryError::Disconnected`] when the renderer is
    /// gone.
    pub fn offer(&mut self, payload: &Payload) -> Result<Delivery, DeliveryError> {
        let text = payload.to_json_string().map_err(DeliveryError::Encode)?;
        if self.state == HandshakeState::Ready {
            self.send(text)?;
            return Ok(Delivery::Delivered);
        }
        if self.pending.replace(text).is_some() {
            trace!(target: HANDSHAKE_TARGET, "replaced pending payload");
        }
        Ok(Delivery::Buffered)
    }

    /// Drops the pending payload and the target.
    pub fn dispose(&mut self) {
        if self.pending.take().is_some() {
            debug!(target: HANDSHAKE_TARGET, "discarded pending payload on dispose");
        }
        self.target = None;
        self.state = HandshakeState::Uninitialized;
    }

    fn send(&mut self, payload: String) -> Result<(), DeliveryError> {
        let Some(target) = self.target.as_mut() else {
            warn!(target: HANDSHAKE_TARGET, "ready without an attached renderer");
            return Err(DeliveryError::Disconnected);
        };
        target.deliver(payload)
    }
}
