//! Host side of varplot.
//!
//! The host resolves what to plot, drives the extractor through the debug
//! adapter and hands payloads to a renderer through the ready handshake
//! ([`HandshakeController`]). [`HostController`] owns the single plot panel
//! and decides which failures become user notices. [`run`] is the entry point
//! of the `varplot` binary.

mod cli;
mod commands;
mod config;
mod controller;
mod errors;
mod expression;
mod handshake;
mod notifier;
mod output;
mod panel;
mod telemetry;

#[cfg(test)]
mod tests;

use std::ffi::OsString;
use std::fmt::Display;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;

use crate::cli::Cli;
use crate::config::{ConfigLoader, OrthoConfigLoader, split_arguments};

pub use controller::{HostController, NO_SELECTION_NOTICE, NO_SESSION_NOTICE, PlotOutcome};
pub use errors::{AppError, DeliveryError};
pub use expression::ExpressionSource;
pub use handshake::{ChannelTarget, Delivery, DeliveryTarget, HandshakeController, HandshakeState};
pub use notifier::{Notifier, WriterNotifier};
pub use output::{frame_document, viewport_path, write_frame};
pub use panel::{PanelFactory, PlotPanel, RendererPanel, RendererPanelFactory};
pub use telemetry::{TelemetryError, TelemetryHandle, initialise as initialise_telemetry};

/// Runs the `varplot` binary with the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader + ?Sized,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_arguments(&args);

    let result = Cli::try_parse_from(&split.command_arguments)
        .map_err(AppError::CliUsage)
        .and_then(|cli| {
            loader
                .load(&split.config_arguments)
                .map(|config| (cli, config))
        })
        .and_then(|(cli, config)| {
            telemetry::initialise(&config)?;
            commands::execute(&cli.command, &config, stdout, stderr)
        });

    match result {
        Ok(exit_code) => exit_code,
        Err(AppError::CliUsage(error)) if !error.use_stderr() => {
            report(stdout, &error);
            ExitCode::SUCCESS
        }
        Err(error) => {
            report(stderr, &error);
            ExitCode::FAILURE
        }
    }
}

fn report<T: Write, D: Display + ?Sized>(writer: &mut T, message: &D) {
    if let Err(error) = writeln!(writer, "{message}") {
        warn!(target: "varplot_host::run", %error, "failed to report outcome");
    }
}
