//! Per-target registry of interaction handlers with explicit disposal.

use tracing::trace;

use crate::surface::{ChartSurface, Relayout};
use crate::tooltip::Tooltip;

const SUBSCRIPTION_TARGET: &str = "varplot_render::subscription";

/// Pointer and view events delivered to a render target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    /// The pointer moved; coordinates are relative to the surface origin.
    PointerMove {
        /// Horizontal position.
        x: f64,
        /// Vertical position.
        y: f64,
    },
    /// The pointer left the surface.
    PointerLeave,
    /// The view was panned or zoomed and redrawn.
    Relayout(Relayout),
}

impl SurfaceEvent {
    /// Kind used to match subscriptions.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::PointerMove { .. } => EventKind::PointerMove,
            Self::PointerLeave => EventKind::PointerLeave,
            Self::Relayout(_) => EventKind::Relayout,
        }
    }
}

/// Event discriminant a handler subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`SurfaceEvent::PointerMove`].
    PointerMove,
    /// [`SurfaceEvent::PointerLeave`].
    PointerLeave,
    /// [`SurfaceEvent::Relayout`].
    Relayout,
}

/// Reacts to surface events.
pub trait InteractionHandler: Send {
    /// Handles one event.
    fn handle(&mut self, event: &SurfaceEvent, surface: &mut dyn ChartSurface, tooltip: &mut Tooltip);
}

impl<F> InteractionHandler for F
where
    F: FnMut(&SurfaceEvent, &mut dyn ChartSurface, &mut Tooltip) + Send,
{
    fn handle(&mut self, event: &SurfaceEvent, surface: &mut dyn ChartSurface, tooltip: &mut Tooltip) {
        self(event, surface, tooltip);
    }
}

/// Handle returned by [`SubscriptionRegistry::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    handler: Box<dyn InteractionHandler>,
}

/// Owns every handler attached to one render target.
#[derive(Default)]
pub struct SubscriptionRegistry {
    next_id: u64,
    entries: Vec<Subscription>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `handler` to events of `kind`.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl InteractionHandler + 'static,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push(Subscription {
            id,
            kind,
            handler: Box::new(handler),
        });
        id
    }

    /// Detaches one handler. Returns whether it was registered.
    pub fn dispose(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        before != self.entries.len()
    }

    /// Detaches every handler and returns how many there were.
    pub fn dispose_all(&mut self) -> usize {
        let disposed = self.entries.len();
        self.entries.clear();
        trace!(target: SUBSCRIPTION_TARGET, disposed, "disposed subscriptions");
        disposed
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no handler is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delivers `event` to every matching handler in subscription order.
    pub fn dispatch(
        &mut self,
        event: &SurfaceEvent,
        surface: &mut dyn ChartSurface,
        tooltip: &mut Tooltip,
    ) {
        let kind = event.kind();
        for entry in self.entries.iter_mut().filter(|entry| entry.kind == kind) {
            entry.handler.handle(event, surface, tooltip);
        }
    }
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("live", &self.entries.len())
            .finish_non_exhaustive()
    }
}
