//! DMS harness CLI library
//!
//! Command-line companion to the `dms-harness` crate: prints the resolved
//! configuration, smoke-tests the REST API, generates test data and (with
//! the `browser` feature) checks the UI login.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{ApiSmokeArgs, Cli, ColorArg, Commands, ConfigArgs, FixtureKind, FixturesArgs, LoginCheckArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Reporter;
pub use runner::run;
