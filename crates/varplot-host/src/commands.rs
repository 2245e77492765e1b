//! The `plot` and `watch` commands.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, trace};
use varplot_config::Config;
use varplot_dap::{ClientError, DapClient, DapEvent, DebugSession, ExtractorBridge};
use varplot_render::{Frame, RenderOptions};

use crate::cli::CliCommand;
use crate::controller::{HostController, PlotOutcome};
use crate::errors::AppError;
use crate::expression::ExpressionSource;
use crate::notifier::{Notifier, WriterNotifier};
use crate::output::write_frame;
use crate::panel::{RendererPanel, RendererPanelFactory};

const COMMANDS_TARGET: &str = "varplot_host::commands";

/// Source of adapter events for watch mode.
pub(crate) trait EventSource {
    /// Blocks for the next adapter event.
    fn next_event(&self) -> Result<DapEvent, ClientError>;
}

impl EventSource for DapClient {
    fn next_event(&self) -> Result<DapEvent, ClientError> {
        Self::next_event(self)
    }
}

/// Connects to the adapter and runs `command`.
pub(crate) fn execute<W: Write, E: Write>(
    command: &CliCommand,
    config: &Config,
    stdout: &mut W,
    stderr: &mut E,
) -> Result<ExitCode, AppError> {
    let bridge = ExtractorBridge::from_config(config)?;
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let client = Arc::new(DapClient::connect(config.adapter(), timeout).map_err(AppError::Attach)?);
    info!(target: COMMANDS_TARGET, adapter = %config.adapter(), "attached to debug adapter");

    let (width, height) = config.panel_size();
    let factory = RendererPanelFactory::new(width, height, RenderOptions::from_config(config));
    let session: Arc<dyn DebugSession> = Arc::clone(&client) as Arc<dyn DebugSession>;
    let mut controller =
        HostController::new(session, bridge, WriterNotifier::new(stderr), factory);
    let source = ExpressionSource::Selection(command.expression().to_owned());
    let output = command.output().map(Utf8PathBuf::as_path);

    match command {
        CliCommand::Plot { frame_id, .. } => {
            plot_once(&mut controller, &source, *frame_id, output, stdout, timeout)
        }
        CliCommand::Watch { .. } => watch(
            &mut controller,
            client.as_ref(),
            &source,
            output,
            stdout,
            timeout,
        ),
    }
}

type Controller<N> = HostController<N, RendererPanelFactory>;

fn plot_once<N: Notifier, W: Write>(
    controller: &mut Controller<N>,
    source: &ExpressionSource,
    frame_id: Option<i64>,
    output: Option<&Utf8Path>,
    stdout: &mut W,
    timeout: Duration,
) -> Result<ExitCode, AppError> {
    let outcome = controller.plot_variable_at(source, frame_id)?;
    emit(controller.panel_mut(), output, stdout, timeout)?;
    controller.on_panel_closed();
    Ok(exit_code(&outcome))
}

pub(crate) fn watch<N: Notifier, W: Write, S: EventSource + ?Sized>(
    controller: &mut Controller<N>,
    events: &S,
    source: &ExpressionSource,
    output: Option<&Utf8Path>,
    stdout: &mut W,
    timeout: Duration,
) -> Result<ExitCode, AppError> {
    let outcome = controller.plot_variable(source)?;
    if controller.panel().is_none() {
        return Ok(exit_code(&outcome));
    }
    emit(controller.panel_mut(), output, stdout, timeout)?;

    loop {
        match events.next_event() {
            Ok(event) if event.ends_session() => {
                controller.on_session_ended();
                return Ok(ExitCode::SUCCESS);
            }
            Ok(event) if event.event == "stopped" => {
                debug!(target: COMMANDS_TARGET, thread = ?event.stopped_thread(), "debuggee stopped");
                controller.on_frame_changed()?;
                emit(controller.panel_mut(), output, stdout, timeout)?;
            }
            Ok(event) => trace!(target: COMMANDS_TARGET, event = %event.event, "ignoring event"),
            Err(ClientError::Timeout { .. }) => {}
            Err(ClientError::SessionEnded) => {
                controller.on_session_ended();
                return Ok(ExitCode::SUCCESS);
            }
            Err(error) => {
                controller.on_session_ended();
                return Err(AppError::Session(error));
            }
        }
    }
}

fn emit<W: Write>(
    panel: Option<&mut RendererPanel>,
    output: Option<&Utf8Path>,
    stdout: &mut W,
    timeout: Duration,
) -> Result<(), AppError> {
    let Some(panel) = panel else {
        return Ok(());
    };
    let frame: Option<&Frame> = panel.settle(timeout)?;
    if let Some(frame) = frame {
        write_frame(frame, output, stdout)?;
    }
    Ok(())
}

const fn exit_code(outcome: &PlotOutcome) -> ExitCode {
    match outcome {
        PlotOutcome::Notified(_) => ExitCode::FAILURE,
        PlotOutcome::Plotted | PlotOutcome::Skipped => ExitCode::SUCCESS,
    }
}
