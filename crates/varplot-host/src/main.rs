//! Entry point of the `varplot` binary.
//!
//! Delegates to [`varplot_host::run`], which loads configuration, attaches to
//! the debug adapter and writes rendered frames.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    varplot_host::run(std::env::args_os(), &mut stdout, &mut stderr)
}
