//! # biocheck CLI entry point
//!
//! Parses the command line, sets up logging and runs the product checks on
//! a blocking task while watching for Ctrl-C.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use biocheck_cli::check::{run_check, CheckArgs, Settings};
use biocheck_cli::config::CliConfig;
use biocheck_cli::version_text;
use biocheck_core::ExitStatus;

/// BIOMASS product internal consistency checker.
///
/// Checks that each product agrees with its Main Product Header: compact
/// creation date, referenced files, file sizes and component schemas.
/// Exits with 0 when all products are OK, 2 on errors, 3 on warnings only
/// and 1 when interrupted.
#[derive(Parser, Debug)]
#[command(name = "biocheck", about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Output version information and exit.
    #[arg(long)]
    version: bool,

    /// Raise log detail. Repeat for more (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// YAML configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(flatten)]
    check: CheckArgs,

    /// BIOMASS product directories.
    #[arg(value_name = "BIOMASS product", required_unless_present = "version")]
    products: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("{}", version_text());
        return ExitCode::SUCCESS;
    }

    let config = cli.config.as_deref().map(CliConfig::load).transpose();
    let quiet = cli.check.quiet || matches!(&config, Ok(Some(c)) if c.quiet);
    init_tracing(quiet, cli.verbose);

    let config = match config {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            tracing::error!("{e}");
            return exit(ExitStatus::Failed);
        }
    };
    let settings = cli.check.resolve(&config);
    tracing::debug!(?settings, products = cli.products.len(), "biocheck starting");

    match verify(cli.products, settings) {
        Ok(status) => exit(status),
        Err(e) => {
            tracing::error!("{e:#}");
            exit(ExitStatus::Failed)
        }
    }
}

/// Log to stdout as `LEVEL message fields`. `RUST_LOG` overrides the
/// threshold chosen from `--quiet` and `-v`.
fn init_tracing(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal())
        .without_time()
        .with_writer(std::io::stdout)
        .init();
}

/// Run the checks on a blocking task and race them against Ctrl-C.
fn verify(products: Vec<PathBuf>, settings: Settings) -> anyhow::Result<ExitStatus> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("could not start runtime")?;

    let status = runtime.block_on(async move {
        // `Stdout` locks per write. Holding the lock across a check would
        // block the interrupt arm's log line until the check finished.
        let verification =
            tokio::task::spawn_blocking(move || run_check(&products, &settings, &mut std::io::stdout()));
        tokio::select! {
            joined = verification => joined
                .context("verification task failed")
                .and_then(|result| result.context("could not write to stdout")),
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    tracing::warn!("interrupted");
                    Ok(ExitStatus::Interrupted)
                }
                Err(e) => Err(anyhow::Error::new(e).context("could not listen for Ctrl-C")),
            },
        }
    });

    // The blocking task may still be inside a product check.
    runtime.shutdown_background();
    status
}

fn exit(status: ExitStatus) -> ExitCode {
    ExitCode::from(status.code())
}
