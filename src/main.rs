//! scoped-store binary entry point.

use std::process::ExitCode;

use scoped_store::cli::{self, Args};
use scoped_store::config::Config;
use scoped_store::{logging, run_simulation, Report};
use tracing::{error, info};

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!("Run 'scoped-store --help' for usage.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }

    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(args)?;
    logging::try_init_with_level(config.log_filter())?;

    info!("scoped-store v{}", env!("CARGO_PKG_VERSION"));
    let simulation = config.to_simulation_config()?;
    let report = run_simulation(&simulation)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(())
}

fn print_summary(report: &Report) {
    println!("registry {} ({} cells)", report.registry, report.cells);
    for store in &report.stores {
        println!(
            "  {}: generation={} counters={} events={} sessions={} failed={} resets={}",
            store.store,
            store.generation,
            store.counters,
            store.events,
            store.sessions,
            store.failed,
            store.resets
        );
    }
}
