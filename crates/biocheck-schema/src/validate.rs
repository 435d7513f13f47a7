//! # Schema Validation
//!
//! Validation of one XML document against one XSD, in three stages:
//!
//! 1. **Schema** — the XSD is parsed and compiled. Every libxml2 complaint
//!    becomes a diagnostic and the document is not looked at.
//! 2. **Document** — the target file is read and parsed. A document that is
//!    not well-formed XML fails validation.
//! 3. **Validation** — the parsed tree is checked against the compiled
//!    schema. Each violation becomes one diagnostic with file and line.
//!
//! The outcome is a [`ValidationReport`], never a Rust error: a broken
//! schema or document is a finding about the product, not a failure of the
//! checker.

use std::fmt;
use std::path::{Path, PathBuf};

use libxml::error::StructuredError;
use libxml::parser::Parser;
use libxml::schemas::{SchemaParserContext, SchemaValidationContext};

use crate::builtin::{BUILTIN_MPH_SCHEMA, BUILTIN_SCHEMA_NAME};
use crate::imports::{scan_schema, RemoteImports};

/// Where a schema comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// A schema document held in memory.
    Embedded {
        /// Name used in diagnostics.
        name: &'static str,
        /// The XSD text.
        document: &'static str,
    },
    /// A schema file on disk.
    File(PathBuf),
}

impl SchemaSource {
    /// The embedded BIOMASS MPH schema.
    pub fn builtin_mph() -> Self {
        Self::Embedded {
            name: BUILTIN_SCHEMA_NAME,
            document: BUILTIN_MPH_SCHEMA,
        }
    }

    /// How the schema is named in log lines.
    pub fn label(&self) -> String {
        match self {
            Self::Embedded { name, .. } => (*name).to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// The validation stage a diagnostic was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Schema,
    Document,
    Validation,
}

/// One diagnostic line from the schema engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub stage: Stage,
    /// File the problem was found in, when the engine knows it.
    pub filename: Option<String>,
    /// 1-based line, when the engine knows it.
    pub line: Option<i64>,
    pub message: String,
}

impl Diagnostic {
    fn new(stage: Stage, filename: Option<String>, line: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            stage,
            filename,
            line,
            message: message.into(),
        }
    }

    fn from_libxml(stage: Stage, err: &StructuredError) -> Self {
        let message = err
            .message
            .as_deref()
            .map(str::trim_end)
            .unwrap_or("unknown libxml2 error");
        Self::new(stage, err.filename.clone(), err.line.map(i64::from), message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self.filename.as_deref().unwrap_or("<unknown>");
        match self.line {
            Some(line) => write!(f, "{file}:{line}: {}", self.message),
            None => write!(f, "{file}: {}", self.message),
        }
    }
}

/// Outcome of validating one document against one schema.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    document: PathBuf,
    schema: String,
    valid: bool,
    diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    fn passed(document: &Path, schema: String) -> Self {
        Self {
            document: document.to_path_buf(),
            schema,
            valid: true,
            diagnostics: Vec::new(),
        }
    }

    fn failed(document: &Path, schema: String, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            document: document.to_path_buf(),
            schema,
            valid: false,
            diagnostics,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Diagnostics in the order the engine produced them.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The validated document.
    pub fn document(&self) -> &Path {
        &self.document
    }

    /// Label of the schema used.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// The stage validation stopped in, if it failed.
    pub fn failed_stage(&self) -> Option<Stage> {
        if self.valid {
            return None;
        }
        self.diagnostics.first().map(|d| d.stage)
    }

    /// Emit the report through `tracing`.
    ///
    /// A pass is logged at debug level. A failure produces one error line
    /// naming document and schema followed by one error line per diagnostic.
    pub fn log(&self) {
        let document = self.document.display();
        if self.valid {
            tracing::debug!(
                file = %document,
                "file '{document}' valid according to schema '{}'",
                self.schema
            );
            return;
        }

        match self.failed_stage() {
            Some(Stage::Schema) => {
                tracing::error!(file = %document, "could not parse schema '{}'", self.schema)
            }
            _ => tracing::error!(
                file = %document,
                "could not verify '{document}' against schema '{}'",
                self.schema
            ),
        }
        for diagnostic in &self.diagnostics {
            tracing::error!(file = %document, "{diagnostic}");
        }
    }
}

/// XSD validator backed by libxml2.
///
/// Holds no compiled state: every call compiles its schema afresh, so a
/// product schema never leaks into the check of another product.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator {
    remote_imports: RemoteImports,
}

impl SchemaValidator {
    pub fn new(remote_imports: RemoteImports) -> Self {
        Self { remote_imports }
    }

    /// Policy applied to [`SchemaSource::File`] schemas.
    pub fn remote_imports(&self) -> RemoteImports {
        self.remote_imports
    }

    /// Validate `document` against `schema`.
    pub fn validate(&self, document: &Path, schema: &SchemaSource) -> ValidationReport {
        let label = schema.label();

        let mut parser = match self.schema_parser(schema) {
            Ok(parser) => parser,
            Err(diagnostics) => return ValidationReport::failed(document, label, diagnostics),
        };

        let mut context = match SchemaValidationContext::from_parser(&mut parser) {
            Ok(context) => context,
            Err(errors) => {
                let diagnostics = stage_diagnostics(Stage::Schema, &errors, || {
                    Diagnostic::new(
                        Stage::Schema,
                        Some(label.clone()),
                        None,
                        "schema could not be compiled",
                    )
                });
                return ValidationReport::failed(document, label, diagnostics);
            }
        };

        let doc = match parse_document(document) {
            Ok(doc) => doc,
            Err(diagnostic) => return ValidationReport::failed(document, label, vec![diagnostic]),
        };

        match context.validate_document(&doc) {
            Ok(()) => ValidationReport::passed(document, label),
            Err(errors) => {
                let diagnostics = stage_diagnostics(Stage::Validation, &errors, || {
                    Diagnostic::new(
                        Stage::Validation,
                        Some(document.display().to_string()),
                        None,
                        "document is not valid",
                    )
                });
                ValidationReport::failed(document, label, diagnostics)
            }
        }
    }

    fn schema_parser(&self, schema: &SchemaSource) -> Result<SchemaParserContext, Vec<Diagnostic>> {
        match schema {
            SchemaSource::Embedded { document, .. } => Ok(SchemaParserContext::from_buffer(*document)),
            SchemaSource::File(path) => {
                if self.remote_imports == RemoteImports::Reject {
                    check_local_only(path)?;
                }
                let path_str = path.to_str().ok_or_else(|| {
                    vec![Diagnostic::new(
                        Stage::Schema,
                        Some(path.display().to_string()),
                        None,
                        "schema path is not valid UTF-8",
                    )]
                })?;
                Ok(SchemaParserContext::from_file(path_str))
            }
        }
    }
}

/// Refuse a schema file that references remote locations, directly or
/// through the local schemas it includes.
///
/// A referenced schema that cannot be parsed is refused too, since its
/// references cannot be inspected. Unreadable files pass; libxml2 reports
/// them when compiling.
fn check_local_only(path: &Path) -> Result<(), Vec<Diagnostic>> {
    let scan = scan_schema(path);
    if scan.is_local_only() {
        return Ok(());
    }
    let unparsable = scan.unparsable.into_iter().map(|u| {
        Diagnostic::new(
            Stage::Schema,
            Some(u.schema.display().to_string()),
            Some(i64::from(u.line)),
            format!("could not check schema for remote imports: {}", u.message),
        )
    });
    let remote = scan.remote.into_iter().map(|r| {
        Diagnostic::new(
            Stage::Schema,
            Some(r.schema.display().to_string()),
            Some(i64::from(r.reference.line)),
            format!(
                "{} of remote location '{}' is not allowed (remote imports are disabled)",
                r.reference.element, r.reference.location
            ),
        )
    });
    Err(remote.chain(unparsable).collect())
}

/// Parse the target document, reporting well-formedness errors with a line.
fn parse_document(path: &Path) -> Result<libxml::tree::Document, Diagnostic> {
    let file = Some(path.display().to_string());
    let bytes = std::fs::read(path)
        .map_err(|e| Diagnostic::new(Stage::Document, file.clone(), None, format!("cannot read file: {e}")))?;

    // libxml2 recovers from some syntax errors by default; check
    // well-formedness first so such documents are rejected. Non-UTF-8
    // documents are left to libxml2's own encoding handling.
    if let Ok(text) = std::str::from_utf8(&bytes) {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        if let Err(e) = roxmltree::Document::parse_with_options(text, options) {
            let pos = e.pos();
            return Err(Diagnostic::new(Stage::Document, file, Some(i64::from(pos.row)), e.to_string()));
        }
    }

    let path_str = path.to_str().ok_or_else(|| {
        Diagnostic::new(Stage::Document, file.clone(), None, "document path is not valid UTF-8")
    })?;
    Parser::default()
        .parse_file(path_str)
        .map_err(|e| Diagnostic::new(Stage::Document, file, None, format!("could not parse document: {e:?}")))
}

fn stage_diagnostics(
    stage: Stage,
    errors: &[StructuredError],
    fallback: impl FnOnce() -> Diagnostic,
) -> Vec<Diagnostic> {
    if errors.is_empty() {
        return vec![fallback()];
    }
    errors.iter().map(|e| Diagnostic::from_libxml(stage, e)).collect()
}
