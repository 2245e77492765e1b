//! Test suites for the varplot host.

mod run;
mod support;
