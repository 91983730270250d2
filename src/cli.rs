//! Command-line interface for the scoped-store simulator.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
///
/// Workload options are `None` unless given, so lower-priority sources
/// (environment, config file) keep their values.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Number of stores.
    pub stores: Option<usize>,
    /// Sessions per store.
    pub sessions: Option<usize>,
    /// Counter table capacity.
    pub capacity: Option<usize>,
    /// Fail every N-th session.
    pub fail_every: Option<usize>,
    /// Reset every N-th session.
    pub reset_every: Option<usize>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Print the report as JSON.
    pub json: bool,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('s') | Long("stores") => {
                result.stores = Some(count(&mut parser, "stores")?);
            }
            Short('n') | Long("sessions") => {
                result.sessions = Some(count(&mut parser, "sessions")?);
            }
            Long("capacity") => {
                result.capacity = Some(count(&mut parser, "capacity")?);
            }
            Long("fail-every") => {
                result.fail_every = Some(count(&mut parser, "fail-every")?);
            }
            Long("reset-every") => {
                result.reset_every = Some(count(&mut parser, "reset-every")?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Long("json") => {
                result.json = true;
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

fn count(parser: &mut lexopt::Parser, name: &'static str) -> Result<usize, ArgsError> {
    use lexopt::ValueExt;

    let value: String = parser.value()?.parse()?;
    value
        .parse()
        .map_err(|_| ArgsError::InvalidValue(name, value))
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"scoped-store {version}
Run simulated analysis sessions against isolated global-state stores

USAGE:
    scoped-store [OPTIONS]

OPTIONS:
    -c, --config <FILE>     Path to configuration file (JSON)
    -s, --stores <N>        Number of independent stores [default: 2]
    -n, --sessions <N>      Sessions per store [default: 3]
        --capacity <N>      Counter table capacity [default: 16]
        --fail-every <N>    Fail every N-th session [default: 0 = never]
        --reset-every <N>   Reset all cells every N-th session [default: 0 = never]
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
        --json              Print the report as JSON
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    SCOPED_STORE_STORES       Number of stores (overrides config)
    SCOPED_STORE_SESSIONS     Sessions per store (overrides config)
    SCOPED_STORE_CAPACITY     Counter table capacity (overrides config)
    SCOPED_STORE_FAIL_EVERY   Failure interval (overrides config)
    SCOPED_STORE_RESET_EVERY  Reset interval (overrides config)
    SCOPED_STORE_LOG_LEVEL    Log level (overrides config)
    RUST_LOG                  Alternative log level setting

EXAMPLES:
    # Two stores, three sessions each
    scoped-store

    # Exercise the failure path on every other session
    scoped-store -s 4 -n 10 --fail-every 2 --json

    # Start with config file
    scoped-store -c simulation.json
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("scoped-store {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
