//! The plot panel: one renderer plus the handshake that feeds it.

use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;
use tracing::debug;
use varplot_protocol::{Payload, RendererMessage};
use varplot_render::{Frame, RenderOptions, RendererHandle, RendererOutput};

use crate::errors::{AppError, DeliveryError};
use crate::handshake::{ChannelTarget, Delivery, HandshakeController, HandshakeState};

const PANEL_TARGET: &str = "varplot_host::panel";

/// What the host controller needs from a panel.
pub trait PlotPanel {
    /// Binds the expression refreshed on every stack-frame change.
    fn bind(&mut self, expression: &str);

    /// The bound expression.
    fn binding(&self) -> Option<&str>;

    /// Sends a payload through the handshake.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] when the renderer cannot take it.
    fn post(&mut self, payload: &Payload) -> Result<Delivery, DeliveryError>;

    /// Tears the panel down. Nothing is delivered afterwards.
    fn close(&mut self);
}

/// Opens panels.
pub trait PanelFactory {
    /// Panel type produced.
    type Panel: PlotPanel;

    /// Opens a new panel.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Renderer`] when the renderer cannot start.
    fn open(&self) -> Result<Self::Panel, AppError>;
}

/// Panel backed by a [`RendererHandle`] thread.
#[derive(Debug)]
pub struct RendererPanel {
    renderer: RendererHandle,
    handshake: HandshakeController<ChannelTarget>,
    binding: Option<String>,
    latest: Option<Frame>,
    awaiting_frame: bool,
}

impl RendererPanel {
    /// Starts a renderer and attaches it to a fresh handshake.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Renderer`] when the thread cannot be spawned.
    pub fn open(width: u32, height: u32, options: RenderOptions) -> Result<Self, AppError> {
        let renderer = RendererHandle::spawn(width, height, options).map_err(AppError::Renderer)?;
        let mut handshake = HandshakeController::new();
        handshake.attach(ChannelTarget::new(renderer.sender()));
        Ok(Self {
            renderer,
            handshake,
            binding: None,
            latest: None,
            awaiting_frame: false,
        })
    }

    /// Handshake phase.
    #[must_use]
    pub const fn handshake_state(&self) -> HandshakeState {
        self.handshake.state()
    }

    /// The most recent frame reported by the renderer.
    #[must_use]
    pub const fn latest_frame(&self) -> Option<&Frame> {
        self.latest.as_ref()
    }

    /// Processes renderer output until the last posted payload has been
    /// drawn.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::RenderTimeout`] when `timeout` passes first and
    /// [`AppError::Delivery`] when the renderer goes away.
    pub fn settle(&mut self, timeout: Duration) -> Result<Option<&Frame>, AppError> {
        let deadline = Instant::now() + timeout;
        while self.awaiting_frame || self.handshake.has_pending() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.renderer.receiver().recv_timeout(remaining) {
                Ok(output) => self.absorb(output)?,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(AppError::RenderTimeout {
                        timeout_secs: timeout.as_secs(),
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(AppError::Delivery(DeliveryError::Disconnected));
                }
            }
        }
        Ok(self.latest.as_ref())
    }

    fn absorb(&mut self, output: RendererOutput) -> Result<(), DeliveryError> {
        match output {
            RendererOutput::Message(RendererMessage::Ready) => {
                if self.handshake.on_ready()? {
                    self.awaiting_frame = true;
                }
            }
            RendererOutput::Frame(frame) => {
                debug!(target: PANEL_TARGET, status = %frame.status, "frame received");
                self.latest = Some(*frame);
                self.awaiting_frame = false;
            }
        }
        Ok(())
    }
}

impl PlotPanel for RendererPanel {
    fn bind(&mut self, expression: &str) {
        self.binding = Some(expression.to_owned());
    }

    fn binding(&self) -> Option<&str> {
        self.binding.as_deref()
    }

    fn post(&mut self, payload: &Payload) -> Result<Delivery, DeliveryError> {
        let delivery = self.handshake.offer(payload)?;
        if delivery == Delivery::Delivered {
            self.awaiting_frame = true;
        }
        Ok(delivery)
    }

    fn close(&mut self) {
        self.handshake.dispose();
        self.binding = None;
        self.awaiting_frame = false;
        self.renderer.shutdown();
    }
}

/// Opens [`RendererPanel`]s of a fixed size.
#[derive(Debug, Clone, Copy)]
pub struct RendererPanelFactory {
    width: u32,
    height: u32,
    options: RenderOptions,
}

impl RendererPanelFactory {
    /// Creates a factory for `width x height` panels.
    #[must_use]
    pub const fn new(width: u32, height: u32, options: RenderOptions) -> Self {
        Self {
            width,
            height,
            options,
        }
    }
}

impl PanelFactory for RendererPanelFactory {
    type Panel = RendererPanel;

    fn open(&self) -> Result<Self::Panel, AppError> {
        RendererPanel::open(self.width, self.height, self.options)
    }
}
