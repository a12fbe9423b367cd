//! CLI command definitions using clap

use crate::config::ColorChoice;
use clap::{Parser, Subcommand, ValueEnum};

/// dms-harness: checks and test data for the DMS end-to-end suite
#[derive(Parser, Debug)]
#[command(name = "dms-harness")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v enables harness debug logging)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the resolved configuration (secrets redacted)
    Config(ConfigArgs),

    /// Check that the DMS API is reachable, authorised and fast enough
    ApiSmoke(ApiSmokeArgs),

    /// Generate test data
    Fixtures(FixturesArgs),

    /// Log in through the UI with the configured credentials (needs chromium)
    LoginCheck(LoginCheckArgs),
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Print as a JSON object
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the api-smoke command
#[derive(Parser, Debug)]
pub struct ApiSmokeArgs {
    /// Latency budget per call in milliseconds
    #[arg(long, default_value = "2000")]
    pub max_latency_ms: u64,
}

/// Arguments for the fixtures command
#[derive(Parser, Debug)]
pub struct FixturesArgs {
    /// What to generate
    #[arg(value_enum)]
    pub kind: FixtureKind,

    /// How many values
    #[arg(short = 'n', long, default_value = "1")]
    pub count: usize,

    /// Reference date for next-business-day (YYYY-MM-DD, default today)
    #[arg(long)]
    pub from: Option<String>,
}

/// Arguments for the login-check command
#[derive(Parser, Debug)]
pub struct LoginCheckArgs {
    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Save a screenshot after logging in
    #[arg(long)]
    pub snapshot: bool,
}

/// Generated test data kinds
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureKind {
    /// `RO-<year>-<5 digits>`
    OrderNumber,
    /// 17-character VIN
    Vin,
    /// Next weekday after the reference date
    NextBusinessDay,
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum ColorArg {
    /// Detect terminal
    #[default]
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
