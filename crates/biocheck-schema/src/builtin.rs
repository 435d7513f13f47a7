//! Embedded BIOMASS Main Product Header schema.
//!
//! `schemas/bio-mph.xsd` is the `bio` namespace schema with annotations
//! stripped:
//!
//! ```text
//! xsltproc filter.xslt bio.xsd | xmllint --format -
//! ```
//!
//! where `filter.xslt` is an identity transform that drops `xsd:annotation`
//! and strips whitespace in `xsd:element`.

/// Name used for the embedded schema in diagnostics.
pub const BUILTIN_SCHEMA_NAME: &str = "built-in schema";

/// The BIOMASS MPH schema document.
pub const BUILTIN_MPH_SCHEMA: &str = include_str!("../schemas/bio-mph.xsd");
