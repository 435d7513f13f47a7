//! # biocheck-core — Foundational Types for biocheck
//!
//! Leaf crate of the biocheck workspace. It holds the pieces of the product
//! consistency check that need no filesystem or XML access:
//!
//! - [`compact`] — the base-36 "compact creation date" codec used in
//!   BIOMASS product directory names.
//! - [`temporal`] — the MPH `processingDate` timestamp and the fixed
//!   2000-01-01 epoch the compact date is counted from.
//! - [`verdict`] — per-product verdicts, their severity ordering, and the
//!   reduction of many verdicts into one process exit status.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `biocheck-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod compact;
pub mod error;
pub mod temporal;
pub mod verdict;

pub use compact::{decode, encode, encode_duration, CompactDate};
pub use error::{CodecError, CompactDateError, DateError};
pub use temporal::{epoch, ProcessingDate, EPOCH_UNIX_SECONDS, PROCESSING_DATE_FORMAT};
pub use verdict::{aggregate, Aggregator, ExitStatus, Severity, Verdict};
