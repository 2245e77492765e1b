//! Tests for the binary entry point.

use std::ffi::OsString;
use std::process::ExitCode;

use rstest::rstest;
use varplot_config::Config;

use crate::config::ConfigLoader;
use crate::errors::AppError;
use crate::run_with_loader;

struct StaticConfigLoader {
    config: Config,
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

fn invoke(args: &[&str]) -> (ExitCode, String, String) {
    let loader = StaticConfigLoader {
        config: Config::default(),
    };
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = run_with_loader(
        args.iter().map(OsString::from),
        &mut stdout,
        &mut stderr,
        &loader,
    );
    (
        exit,
        String::from_utf8(stdout).expect("utf-8 stdout"),
        String::from_utf8(stderr).expect("utf-8 stderr"),
    )
}

#[rstest]
fn help_goes_to_stdout() {
    let (exit, stdout, stderr) = invoke(&["varplot", "--help"]);

    assert_eq!(exit, ExitCode::SUCCESS);
    assert!(stdout.contains("Usage"), "help text: {stdout}");
    assert!(stderr.is_empty());
}

#[rstest]
fn missing_subcommand_is_a_usage_error() {
    let (exit, stdout, stderr) = invoke(&["varplot"]);

    assert_eq!(exit, ExitCode::FAILURE);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Usage"), "usage text: {stderr}");
}

#[rstest]
fn plotting_without_an_extractor_script_fails_before_attaching() {
    let (exit, _, stderr) = invoke(&["varplot", "plot", "img"]);

    assert_eq!(exit, ExitCode::FAILURE);
    assert!(
        stderr.contains("no extractor script configured"),
        "stderr: {stderr}"
    );
}
