//! Configuration loading for the `varplot` binary.
//!
//! Leading configuration flags are routed to `ortho-config`; everything from
//! the first other token onwards is parsed by clap as the command.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use varplot_config::Config;

use crate::errors::AppError;

/// Flags understood by the configuration loader.
///
/// Keep in sync with the fields of [`Config`].
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--adapter",
    "--log-filter",
    "--log-format",
    "--extractor-script",
    "--extractor-entry",
    "--evaluate-context",
    "--request-timeout-secs",
    "--panel-width",
    "--panel-height",
    "--point-gl-threshold",
];

/// Loads configuration for the binary.
pub(crate) trait ConfigLoader {
    /// Loads configuration from the leading configuration flags.
    ///
    /// Configuration flags must precede the subcommand; later ones belong to
    /// the command.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

/// Layered loader backed by `ortho-config`.
pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    if !text.starts_with("--") {
        return FlagAction::Stop;
    }
    let (flag, inline_value) = text
        .split_once('=')
        .map_or((&*text, false), |(flag, _)| (flag, true));
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Arguments split between the loader and the command parser.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ArgumentSplit {
    /// Program name plus configuration flags.
    pub(crate) config_arguments: Vec<OsString>,
    /// Program name plus the command.
    pub(crate) command_arguments: Vec<OsString>,
}

/// Splits `args` at the first token that is not a configuration flag.
pub(crate) fn split_arguments(args: &[OsString]) -> ArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ArgumentSplit::default();
    };
    let mut config_arguments = vec![program.clone()];
    let mut remaining = rest.iter().peekable();
    while let Some(argument) = remaining.peek() {
        let FlagAction::Include { needs_value } = classify(argument) else {
            break;
        };
        config_arguments.extend(remaining.next().cloned());
        if needs_value {
            config_arguments.extend(remaining.next().cloned());
        }
    }
    let mut command_arguments = vec![program.clone()];
    command_arguments.extend(remaining.cloned());
    ArgumentSplit {
        config_arguments,
        command_arguments,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn args(items: &[&str]) -> Vec<OsString> {
        items.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case("--log-filter=debug", FlagAction::Include { needs_value: false })]
    #[case("--adapter", FlagAction::Include { needs_value: true })]
    #[case("--output", FlagAction::Stop)]
    #[case("plot", FlagAction::Stop)]
    fn classifies_flags(#[case] argument: &str, #[case] expected: FlagAction) {
        assert_eq!(classify(OsStr::new(argument)), expected);
    }

    #[rstest]
    fn config_flags_are_split_from_the_command() {
        let split = split_arguments(&args(&[
            "varplot",
            "--adapter",
            "tcp://127.0.0.1:9000",
            "--log-format=compact",
            "plot",
            "img",
            "--output",
            "out.json",
        ]));

        assert_eq!(
            split.config_arguments,
            args(&["varplot", "--adapter", "tcp://127.0.0.1:9000", "--log-format=compact"])
        );
        assert_eq!(
            split.command_arguments,
            args(&["varplot", "plot", "img", "--output", "out.json"])
        );
    }

    #[rstest]
    fn flags_after_the_command_stay_with_it() {
        let split = split_arguments(&args(&["varplot", "watch", "x", "--log-filter", "debug"]));

        assert_eq!(split.config_arguments, args(&["varplot"]));
        assert_eq!(
            split.command_arguments,
            args(&["varplot", "watch", "x", "--log-filter", "debug"])
        );
    }

    #[rstest]
    fn empty_arguments_split_to_nothing() {
        assert_eq!(split_arguments(&[]), ArgumentSplit::default());
    }
}
