//! Host-side orchestration of the "plot variable" command.
//!
//! The controller owns the debug-session handle, the extractor bridge and at
//! most one panel. Explicit requests surface failures as notices; refreshes
//! triggered by stack-frame changes only ever change what the panel shows.

use std::sync::Arc;

use tracing::{debug, info, warn};
use varplot_dap::{BridgeError, DebugSession, Extraction, ExtractorBridge, StagingStore};
use varplot_protocol::Payload;

use crate::errors::AppError;
use crate::expression::ExpressionSource;
use crate::notifier::Notifier;
use crate::panel::{PanelFactory, PlotPanel};

const CONTROLLER_TARGET: &str = "varplot_host::controller";

/// Notice shown when no thread is paused.
pub const NO_SESSION_NOTICE: &str = "No active debug session found! Start debugging first.";

/// Notice shown when no expression could be resolved.
pub const NO_SELECTION_NOTICE: &str = "Please select a variable.";

/// How a refresh was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    /// The user ran the command.
    Explicit,
    /// The stack frame changed under a bound panel.
    FrameChange,
}

/// Result of a plot request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotOutcome {
    /// A data payload went to the panel.
    Plotted,
    /// The request failed; the text was shown to the user.
    Notified(String),
    /// Nothing was attempted.
    Skipped,
}

/// Drives extraction and delivery for a single plot panel.
pub struct HostController<N, F: PanelFactory> {
    session: Arc<dyn DebugSession>,
    bridge: ExtractorBridge,
    staging: StagingStore,
    notifier: N,
    factory: F,
    panel: Option<F::Panel>,
}

impl<N: Notifier, F: PanelFactory> HostController<N, F> {
    /// Creates a controller with no panel open.
    #[must_use]
    pub fn new(
        session: Arc<dyn DebugSession>,
        bridge: ExtractorBridge,
        notifier: N,
        factory: F,
    ) -> Self {
        Self {
            session,
            bridge,
            staging: StagingStore,
            notifier,
            factory,
            panel: None,
        }
    }

    /// The open panel, if any.
    #[must_use]
    pub const fn panel(&self) -> Option<&F::Panel> {
        self.panel.as_ref()
    }

    /// Mutable access to the open panel.
    pub const fn panel_mut(&mut self) -> Option<&mut F::Panel> {
        self.panel.as_mut()
    }

    /// The notifier in use.
    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Plots the expression resolved from `source` in the current top frame.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the panel cannot be opened or the payload
    /// cannot be delivered. User-facing failures are reported through the
    /// notifier and yield [`PlotOutcome::Notified`] instead.
    pub fn plot_variable(&mut self, source: &ExpressionSource) -> Result<PlotOutcome, AppError> {
        self.plot_variable_at(source, None)
    }

    /// Like [`Self::plot_variable`], evaluating in `frame_id` when given.
    ///
    /// # Errors
    ///
    /// See [`Self::plot_variable`].
    pub fn plot_variable_at(
        &mut self,
        source: &ExpressionSource,
        frame_id: Option<i64>,
    ) -> Result<PlotOutcome, AppError> {
        let Some(expression) = source.resolve() else {
            return Ok(self.notify(NO_SELECTION_NOTICE.to_owned()));
        };
        let top_frame = match self.session.top_frame_id() {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(self.notify(NO_SESSION_NOTICE.to_owned())),
            Err(error) => {
                debug!(target: CONTROLLER_TARGET, %error, "stack query failed");
                return Ok(self.notify(NO_SESSION_NOTICE.to_owned()));
            }
        };
        let expression = expression.to_owned();
        let panel = self.panel.take().map_or_else(|| self.open_panel(), Ok)?;
        let panel = self.panel.insert(panel);
        panel.bind(&expression);
        self.refresh(&expression, Some(frame_id.unwrap_or(top_frame)), Trigger::Explicit)
    }

    /// Re-plots the bound expression after a stack-frame change.
    ///
    /// Never shows notices.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Delivery`] when the panel cannot take the payload.
    pub fn on_frame_changed(&mut self) -> Result<PlotOutcome, AppError> {
        let Some(expression) = self
            .panel
            .as_ref()
            .and_then(PlotPanel::binding)
            .map(str::to_owned)
        else {
            return Ok(PlotOutcome::Skipped);
        };
        match self.session.top_frame_id() {
            Ok(Some(frame)) => self.refresh(&expression, Some(frame), Trigger::FrameChange),
            Ok(None) => {
                debug!(target: CONTROLLER_TARGET, "no stopped thread; refresh skipped");
                Ok(PlotOutcome::Skipped)
            }
            Err(error) => {
                debug!(target: CONTROLLER_TARGET, %error, "stack query failed on refresh");
                self.post(&scope_loss(&expression))?;
                Ok(PlotOutcome::Skipped)
            }
        }
    }

    /// The user closed the panel: the binding goes with it.
    pub fn on_panel_closed(&mut self) {
        if let Some(mut panel) = self.panel.take() {
            panel.close();
            debug!(target: CONTROLLER_TARGET, "panel closed by user");
        }
    }

    /// The debug session ended: close the panel.
    pub fn on_session_ended(&mut self) {
        if let Some(mut panel) = self.panel.take() {
            panel.close();
            info!(target: CONTROLLER_TARGET, "debug session ended; panel closed");
        }
    }

    fn refresh(
        &mut self,
        expression: &str,
        frame_id: Option<i64>,
        trigger: Trigger,
    ) -> Result<PlotOutcome, AppError> {
        let (payload, notice) = match self.bridge.extract(self.session.as_ref(), expression, frame_id)
        {
            Ok(Extraction::Staged(path)) => match self.staging.read_and_delete(&path) {
                Ok(payload) => (payload, None),
                Err(error) => {
                    let message = error.to_string();
                    (Payload::error(message.clone()), Some(message))
                }
            },
            Ok(Extraction::Failed(message)) => {
                let notice = format!("Python Error: {message}");
                (Payload::error(message), Some(notice))
            }
            Err(error) => match (trigger, &error) {
                (Trigger::FrameChange, BridgeError::Session(_)) => {
                    debug!(target: CONTROLLER_TARGET, %error, expression, "expression out of scope");
                    (scope_loss(expression), None)
                }
                _ => (
                    Payload::error(format!("Process Failed. Error: {error}")),
                    Some(format!("Error: {error}")),
                ),
            },
        };

        self.post(&payload)?;
        let Some(notice) = notice else {
            return Ok(if matches!(payload, Payload::Error { .. }) {
                PlotOutcome::Skipped
            } else {
                PlotOutcome::Plotted
            });
        };
        if trigger == Trigger::FrameChange {
            debug!(target: CONTROLLER_TARGET, notice, "refresh failed");
            return Ok(PlotOutcome::Skipped);
        }
        Ok(self.notify(notice))
    }

    fn open_panel(&self) -> Result<F::Panel, AppError> {
        info!(target: CONTROLLER_TARGET, "opening plot panel");
        self.factory.open()
    }

    fn post(&mut self, payload: &Payload) -> Result<(), AppError> {
        let Some(panel) = self.panel.as_mut() else {
            warn!(target: CONTROLLER_TARGET, kind = payload.kind().as_str(), "no panel to post to");
            return Ok(());
        };
        panel.post(payload)?;
        Ok(())
    }

    fn notify(&self, notice: String) -> PlotOutcome {
        self.notifier.error(&notice);
        PlotOutcome::Notified(notice)
    }
}

fn scope_loss(expression: &str) -> Payload {
    Payload::error(format!("'{expression}' is not available in this scope"))
}
