//! # biocheck-cli — Command-Line Front End
//!
//! Library half of the `biocheck` binary. `main.rs` parses arguments, sets
//! up logging and the interrupt watcher; the pieces here do the rest:
//!
//! - [`config`] — the optional YAML configuration file.
//! - [`check`] — flag/config merging and the loop over products.
//!
//! ```bash
//! biocheck PRODUCT_ABC123
//! biocheck -q -s data/*/
//! biocheck --config biocheck.yaml --no-remote-imports PRODUCT_ABC123
//! ```

pub mod check;
pub mod config;

/// Copyright line printed by `--version`.
pub const COPYRIGHT: &str = "Copyright (C) 2023 S[&]T, The Netherlands.";

/// Text printed by `--version`.
pub fn version_text() -> String {
    format!("biocheck v{}\n{COPYRIGHT}\n", env!("CARGO_PKG_VERSION"))
}
