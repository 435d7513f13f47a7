//! # biocheck-schema — XML Schema Validation
//!
//! Validates XML documents of a BIOMASS product against W3C XML Schema
//! (XSD 1.0) definitions using libxml2.
//!
//! ## Schema Sources
//!
//! - [`SchemaSource::builtin_mph`] — the BIOMASS Main Product Header schema
//!   compiled into the binary (see [`builtin`]). It imports the OGC
//!   `eop`/`sar`/`gml`/`ows` schemas from `schemas.opengis.net`, so using it
//!   requires network access.
//! - [`SchemaSource::File`] — a schema file shipped inside the product and
//!   referenced from the MPH (`bio:rds`).
//!
//! ## Diagnostics
//!
//! [`SchemaValidator::validate`] never fails with a Rust error. It returns a
//! [`ValidationReport`] holding a pass/fail flag plus every diagnostic
//! libxml2 produced, in order. Callers decide whether to log them
//! ([`ValidationReport::log`]) or inspect them.
//!
//! ## Remote Imports
//!
//! Product schemas may `xs:import` definitions from the network. The
//! [`RemoteImports`] policy decides whether such schemas are compiled as-is
//! or refused up front (see [`imports`]). Refusal looks through the whole
//! graph of local includes, not only the top-level schema file.

pub mod builtin;
pub mod imports;
pub mod validate;

pub use builtin::{BUILTIN_MPH_SCHEMA, BUILTIN_SCHEMA_NAME};
pub use imports::{
    remote_locations, scan_schema, schema_references, ReferenceScan, RemoteImports, RemoteReference,
    SchemaReference, UnparsableSchema,
};
pub use validate::{Diagnostic, SchemaSource, SchemaValidator, Stage, ValidationReport};
