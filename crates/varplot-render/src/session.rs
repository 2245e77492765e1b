//! Renderer-side state: the current plot target, the shared tooltip and the
//! status line.

use serde::Serialize;
use tracing::debug;

use crate::errors::RenderError;
use crate::subscription::{SubscriptionRegistry, SurfaceEvent};
use crate::surface::{ChartSurface, Relayout};
use crate::tooltip::Tooltip;

const SESSION_TARGET: &str = "varplot_render::session";

/// Lifecycle of the plot target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderState {
    /// Nothing has been drawn yet.
    #[default]
    Empty,
    /// A payload is queued for the next paint tick.
    Rendering,
    /// The last payload was drawn.
    Displayed,
    /// The last payload failed to draw; the next payload recovers.
    Error,
}

/// Creates a fresh surface for every payload.
pub type SurfaceFactory<S> = Box<dyn FnMut() -> S + Send>;

/// A surface plus every handler attached to it. Replaced wholesale on each
/// payload so no handler outlives the content it was written for.
#[derive(Debug)]
pub(crate) struct RenderTarget<S> {
    pub(crate) surface: S,
    pub(crate) subscriptions: SubscriptionRegistry,
}

/// State of one renderer instance.
pub struct RenderSession<S: ChartSurface> {
    factory: SurfaceFactory<S>,
    pub(crate) target: RenderTarget<S>,
    tooltip: Option<Tooltip>,
    status: String,
    state: RenderState,
    ready: bool,
}

impl<S: ChartSurface> RenderSession<S> {
    /// Creates a session whose targets come from `factory`.
    pub fn new(mut factory: impl FnMut() -> S + Send + 'static) -> Self {
        let surface = factory();
        Self {
            factory: Box::new(factory),
            target: RenderTarget {
                surface,
                subscriptions: SubscriptionRegistry::new(),
            },
            tooltip: None,
            status: String::new(),
            state: RenderState::Empty,
            ready: false,
        }
    }

    /// Records that the renderer has announced itself. Returns `true` only
    /// the first time.
    pub const fn mark_ready(&mut self) -> bool {
        let first = !self.ready;
        self.ready = true;
        first
    }

    /// Whether the renderer has announced itself.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Current status line.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> RenderState {
        self.state
    }

    /// The surface of the current target.
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.target.surface
    }

    /// The tooltip, once any render has created it.
    #[must_use]
    pub const fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Number of handlers attached to the current target.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.target.subscriptions.len()
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub(crate) const fn set_state(&mut self, state: RenderState) {
        self.state = state;
    }

    /// Hides the tooltip, disposes every handler and swaps in a fresh target.
    pub(crate) fn rebuild_target(&mut self) {
        self.tooltip_mut().hide();
        let disposed = self.target.subscriptions.dispose_all();
        self.target = RenderTarget {
            surface: (self.factory)(),
            subscriptions: SubscriptionRegistry::new(),
        };
        debug!(target: SESSION_TARGET, disposed, "replaced plot target");
    }

    /// Forwards a pointer move to the current target's handlers.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.dispatch(&SurfaceEvent::PointerMove { x, y });
    }

    /// Forwards a pointer leave to the current target's handlers.
    pub fn pointer_leave(&mut self) {
        self.dispatch(&SurfaceEvent::PointerLeave);
    }

    /// Pans or zooms the current target, then notifies its handlers.
    ///
    /// # Errors
    ///
    /// Returns the surface error when the target cannot be relaid out.
    pub fn relayout(&mut self, change: Relayout) -> Result<(), RenderError> {
        self.target.surface.relayout(change)?;
        self.dispatch(&SurfaceEvent::Relayout(change));
        Ok(())
    }

    fn tooltip_mut(&mut self) -> &mut Tooltip {
        self.tooltip.get_or_insert_with(Tooltip::default)
    }

    fn dispatch(&mut self, event: &SurfaceEvent) {
        let tooltip = self.tooltip.get_or_insert_with(Tooltip::default);
        self.target
            .subscriptions
            .dispatch(event, &mut self.target.surface, tooltip);
    }
}

impl<S: ChartSurface> std::fmt::Debug for RenderSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("status", &self.status)
            .field("state", &self.state)
            .field("ready", &self.ready)
            .field("subscriptions", &self.target.subscriptions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rstest::{fixture, rstest};

    use super::*;
    use crate::subscription::EventKind;
    use crate::surface::HeadlessSurface;

    #[fixture]
    fn session() -> RenderSession<HeadlessSurface> {
        RenderSession::new(|| HeadlessSurface::new(200, 100))
    }

    #[rstest]
    fn ready_is_reported_once(mut session: RenderSession<HeadlessSurface>) {
        assert!(!session.is_ready());
        assert!(session.mark_ready());
        assert!(!session.mark_ready());
        assert!(session.is_ready());
    }

    #[rstest]
    fn rebuild_drops_old_handlers(mut session: RenderSession<HeadlessSurface>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        session.target.subscriptions.subscribe(
            EventKind::PointerLeave,
            move |_: &SurfaceEvent, _: &mut dyn ChartSurface, _: &mut Tooltip| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        session.pointer_leave();
        session.rebuild_target();
        session.pointer_leave();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.subscription_count(), 0);
    }

    #[rstest]
    fn tooltip_is_created_lazily_and_hidden_on_rebuild(mut session: RenderSession<HeadlessSurface>) {
        assert!(session.tooltip().is_none());

        session.tooltip_mut().show_at(1.0, 1.0, String::from("Val: 0.000"));
        session.rebuild_target();

        let tooltip = session.tooltip().expect("tooltip kept across renders");
        assert!(!tooltip.is_visible());
    }
}
