//! The renderer as a single-threaded loop behind message channels.
//!
//! The loop announces itself once with [`RendererMessage::Ready`], then
//! drains its inbox in batches. Everything received in one batch is applied
//! before a single paint tick, so back-to-back payloads collapse to the
//! latest.

use std::io;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, RecvError, Sender, unbounded};
use image::RgbaImage;
use serde_json::Value;
use tracing::{debug, info, warn};
use varplot_protocol::{Payload, RendererMessage};

use crate::renderers::RenderOptions;
use crate::router::RenderRouter;
use crate::session::{RenderSession, RenderState};
use crate::surface::{HeadlessSurface, Relayout};

const LOOP_TARGET: &str = "varplot_render::loop";

/// Work sent to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererInput {
    /// Payload JSON exactly as the host forwards it.
    Payload(String),
    /// Pointer moved over the plot.
    PointerMove {
        /// Horizontal surface position.
        x: f64,
        /// Vertical surface position.
        y: f64,
    },
    /// Pointer left the plot.
    PointerLeave,
    /// Pan or zoom.
    Relayout(Relayout),
    /// Stop the loop.
    Shutdown,
}

/// What the renderer reports back.
#[derive(Debug, Clone)]
pub enum RendererOutput {
    /// Protocol message for the host.
    Message(RendererMessage),
    /// State after a paint tick.
    Frame(Box<Frame>),
}

/// Observable result of one paint tick.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Status line.
    pub status: String,
    /// Target lifecycle state.
    pub state: RenderState,
    /// Tooltip text when the tooltip is visible.
    pub tooltip: Option<String>,
    /// JSON description of the surface.
    pub snapshot: Value,
    /// Visible part of the image layer, for image payloads.
    pub viewport: Option<RgbaImage>,
}

/// Owning handle of a running renderer thread.
#[derive(Debug)]
pub struct RendererHandle {
    inbox: Sender<RendererInput>,
    outbox: Receiver<RendererOutput>,
    worker: Option<JoinHandle<()>>,
}

impl RendererHandle {
    /// Starts a renderer drawing onto `width x height` headless surfaces.
    ///
    /// # Errors
    ///
    /// Returns the OS error when the thread cannot be spawned.
    pub fn spawn(width: u32, height: u32, options: RenderOptions) -> io::Result<Self> {
        let (inbox, inbox_rx) = unbounded();
        let (outbox_tx, outbox) = unbounded();
        let worker = thread::Builder::new()
            .name(String::from("varplot-renderer"))
            .spawn(move || {
                let session = RenderSession::new(move || HeadlessSurface::new(width, height));
                let router = RenderRouter::new(session, options);
                run(router, &inbox_rx, &outbox_tx);
            })?;
        Ok(Self {
            inbox,
            outbox,
            worker: Some(worker),
        })
    }

    /// Sender for renderer input.
    #[must_use]
    pub fn sender(&self) -> Sender<RendererInput> {
        self.inbox.clone()
    }

    /// Receiver of renderer output.
    #[must_use]
    pub const fn receiver(&self) -> &Receiver<RendererOutput> {
        &self.outbox
    }

    /// Stops the loop and waits for the thread.
    pub fn shutdown(&mut self) {
        if self.inbox.send(RendererInput::Shutdown).is_err() {
            debug!(target: LOOP_TARGET, "renderer loop already stopped");
        }
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            warn!(target: LOOP_TARGET, "renderer thread panicked");
        }
    }
}

impl Drop for RendererHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(
    mut router: RenderRouter<HeadlessSurface>,
    inbox: &Receiver<RendererInput>,
    outbox: &Sender<RendererOutput>,
) {
    if router.session_mut().mark_ready() {
        info!(target: LOOP_TARGET, "renderer ready");
        if outbox.send(RendererOutput::Message(RendererMessage::Ready)).is_err() {
            return;
        }
    }

    loop {
        let first = match inbox.recv() {
            Ok(input) => input,
            Err(RecvError) => return,
        };
        let mut batch = vec![first];
        batch.extend(inbox.try_iter());

        let mut stop = false;
        for input in batch {
            if !apply(&mut router, input) {
                stop = true;
                break;
            }
        }
        router.on_paint_tick();
        if outbox.send(RendererOutput::Frame(Box::new(frame(&router)))).is_err() || stop {
            debug!(target: LOOP_TARGET, "renderer loop stopping");
            return;
        }
    }
}

/// Applies one input; returns `false` on shutdown.
fn apply(router: &mut RenderRouter<HeadlessSurface>, input: RendererInput) -> bool {
    match input {
        RendererInput::Payload(text) => router.route(parse_payload(&text)),
        RendererInput::PointerMove { x, y } => router.session_mut().pointer_move(x, y),
        RendererInput::PointerLeave => router.session_mut().pointer_leave(),
        RendererInput::Relayout(change) => {
            if let Err(error) = router.session_mut().relayout(change) {
                debug!(target: LOOP_TARGET, %error, "relayout ignored");
            }
        }
        RendererInput::Shutdown => return false,
    }
    true
}

fn parse_payload(text: &str) -> Payload {
    Payload::from_json_str(text).unwrap_or_else(|error| {
        warn!(target: LOOP_TARGET, %error, "malformed payload");
        Payload::error(format!("Parse Error: {error}. Raw output: {text}"))
    })
}

fn frame(router: &RenderRouter<HeadlessSurface>) -> Frame {
    let session = router.session();
    Frame {
        status: session.status().to_owned(),
        state: session.state(),
        tooltip: session
            .tooltip()
            .and_then(|tooltip| tooltip.text())
            .map(str::to_owned),
        snapshot: session.surface().snapshot(),
        viewport: session.surface().render_viewport(),
    }
}
