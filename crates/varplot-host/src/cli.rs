//! Command-line interface of the `varplot` binary.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Plots values from a paused debug session.
#[derive(Parser, Debug)]
#[command(name = "varplot", disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// What to do.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Plots an expression once.
    Plot {
        /// Expression evaluated in the paused frame.
        #[arg(value_name = "EXPR")]
        expression: String,
        /// Frame to evaluate in instead of the top frame.
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        frame_id: Option<i64>,
        /// Writes the figure snapshot here instead of stdout.
        #[arg(long, value_name = "PATH")]
        output: Option<Utf8PathBuf>,
    },
    /// Re-plots an expression every time the debuggee stops.
    Watch {
        /// Expression evaluated in the paused frame.
        #[arg(value_name = "EXPR")]
        expression: String,
        /// Writes the figure snapshot here instead of stdout.
        #[arg(long, value_name = "PATH")]
        output: Option<Utf8PathBuf>,
    },
}

impl CliCommand {
    /// The expression argument.
    pub(crate) fn expression(&self) -> &str {
        match self {
            Self::Plot { expression, .. } | Self::Watch { expression, .. } => expression,
        }
    }

    /// The `--output` argument.
    pub(crate) const fn output(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Plot { output, .. } | Self::Watch { output, .. } => output.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn parses_plot_with_frame() {
        let cli = Cli::try_parse_from(["varplot", "plot", "img", "--frame-id", "7"]).expect("parse");

        match &cli.command {
            CliCommand::Plot { frame_id, .. } => assert_eq!(*frame_id, Some(7)),
            CliCommand::Watch { .. } => panic!("expected plot"),
        }
        assert_eq!(cli.command.expression(), "img");
        assert!(cli.command.output().is_none());
    }

    #[rstest]
    fn parses_watch_with_output() {
        let cli =
            Cli::try_parse_from(["varplot", "watch", "points", "--output", "out.json"]).expect("parse");

        assert!(matches!(cli.command, CliCommand::Watch { .. }));
        assert_eq!(cli.command.output().map(|path| path.as_str()), Some("out.json"));
    }

    #[rstest]
    fn missing_expression_is_a_usage_error() {
        assert!(Cli::try_parse_from(["varplot", "plot"]).is_err());
    }
}
