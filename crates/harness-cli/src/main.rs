//! dms-harness: command-line checks for the DMS end-to-end suite
//!
//! ## Usage
//!
//! ```bash
//! dms-harness config                      # Show resolved configuration
//! dms-harness api-smoke --max-latency-ms 500
//! dms-harness fixtures vin --count 5      # Generate test data
//! dms-harness login-check                 # UI login (feature "browser")
//! ```

use clap::Parser;
use dms_harness_cli::{run, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
