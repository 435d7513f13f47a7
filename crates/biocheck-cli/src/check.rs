//! # Product Verification
//!
//! Checks the products named on the command line one after another and
//! folds their verdicts into the process exit status.

use std::io::{self, Write};
use std::path::PathBuf;

use biocheck_core::{Aggregator, ExitStatus};
use biocheck_product::{CheckOptions, ProductChecker};
use biocheck_schema::RemoteImports;
use clap::Args;

use crate::config::CliConfig;

/// Flags controlling the check.
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Suppress standard output messages and warnings, only errors are printed to screen.
    #[arg(short, long)]
    pub quiet: bool,

    /// Verify Main Product Header against schema (requires internet access).
    #[arg(short, long)]
    pub schema: bool,

    /// Refuse product schemas that import http(s) locations.
    #[arg(long)]
    pub no_remote_imports: bool,
}

/// Effective settings after merging flags over the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub options: CheckOptions,
    pub quiet: bool,
}

impl CheckArgs {
    pub fn resolve(&self, config: &CliConfig) -> Settings {
        let remote_imports = if self.no_remote_imports {
            RemoteImports::Reject
        } else {
            config.remote_imports
        };
        Settings {
            options: CheckOptions {
                verify_manifest_schema: self.schema || config.schema,
                remote_imports,
            },
            quiet: self.quiet || config.quiet,
        }
    }
}

/// Check each product in order and return the combined exit status.
///
/// Unless quiet, every product path is echoed to `out` before its check and
/// followed by a blank line.
pub fn run_check<W: Write>(products: &[PathBuf], settings: &Settings, out: &mut W) -> io::Result<ExitStatus> {
    let checker = ProductChecker::new(settings.options);
    let mut aggregator = Aggregator::new();

    for product in products {
        if !settings.quiet {
            writeln!(out, "{}", product.display())?;
            out.flush()?;
        }
        let outcome = checker.check(product);
        aggregator.record(outcome.verdict());
        if !settings.quiet {
            writeln!(out)?;
        }
    }

    tracing::debug!(
        products = aggregator.products(),
        severity = ?aggregator.severity(),
        "verification finished"
    );
    Ok(aggregator.exit_status())
}
