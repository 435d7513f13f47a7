//! # biocheck-product — BIOMASS Product Reconciliation
//!
//! Checks that a BIOMASS product directory agrees with its Main Product
//! Header (MPH):
//!
//! - the compact creation date at the end of the product name matches the
//!   MPH processing date,
//! - every component the MPH lists exists, has the declared size, and is
//!   valid against its schema when it names one,
//! - every file in the product is listed in the MPH.
//!
//! ## Modules
//!
//! - [`manifest`] — reading the MPH into component descriptors.
//! - [`inventory`] — the set of files in a product, shrunk as the MPH
//!   claims them.
//! - [`reconcile`] — the check itself, producing a [`ProductOutcome`].
//! - [`options`] — [`CheckOptions`] shared by all products of a run.
//!
//! ## Crate Policy
//!
//! - Products are never modified.
//! - Problems with a product are findings, not Rust errors; a product that
//!   cannot be checked at all is a [`StructuralFailure`]. Neither stops the
//!   check of the next product.

pub mod error;
pub mod inventory;
pub mod manifest;
pub mod options;
pub mod reconcile;

pub use error::{ManifestError, StructuralFailure};
pub use inventory::{Inventory, Unlisted};
pub use manifest::{ComponentDescriptor, Manifest};
pub use options::CheckOptions;
pub use reconcile::{
    verify_product, Finding, FindingKind, Level, ProductChecker, ProductOutcome, ProductReport,
};
