//! # Product Reconciliation
//!
//! Cross-checks one BIOMASS product against its Main Product Header.
//!
//! ## Sequence
//!
//! 1. The product root and `<root>/<lowercase name>.xml` must exist.
//! 2. Optionally, the MPH is validated against the built-in schema.
//! 3. The MPH is parsed.
//! 4. The processing date, encoded in base 36, must equal the last six
//!    characters of the product name.
//! 5. The product's files are listed and the MPH is taken out of the list.
//! 6. Each MPH component claims its file; declared sizes are compared and
//!    components with a schema reference are validated against it (the
//!    schema file is claimed too).
//! 7. Files nobody claimed are reported as warnings.
//!
//! Steps 1 and 3 end the check with a [`StructuralFailure`]. Everything
//! else, including directories that cannot be listed in step 5, is
//! collected as [`Finding`]s in a [`ProductReport`].

use std::path::{Path, PathBuf};

use biocheck_core::{CompactDate, ProcessingDate, Verdict};
use biocheck_schema::{SchemaSource, SchemaValidator};

use crate::error::StructuralFailure;
use crate::inventory::Inventory;
use crate::manifest::{ComponentDescriptor, Manifest};
use crate::options::CheckOptions;

/// Whether a finding downgrades the product to an error or a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Error,
    Warning,
}

/// What a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingKind {
    /// The MPH does not validate against the built-in schema.
    ManifestSchemaInvalid,
    /// The MPH has no `eop:processingDate`.
    MissingProcessingDate,
    /// `eop:processingDate` is not `YYYY-MM-DDTHH:MM:SSZ`.
    InvalidProcessingDate,
    /// The product name suffix disagrees with the processing date.
    DateMismatch,
    /// Part of the product directory could not be listed.
    UnreadableDirectory,
    /// A component entry without a file reference.
    MissingHref,
    /// A component names a file that is not in the product.
    MissingReference,
    /// `eop:size` is not a byte count.
    InvalidSize,
    /// The size of a component could not be read.
    UnreadableSize,
    /// The component's byte length differs from `eop:size`.
    SizeMismatch,
    /// The component's schema file is not in the product.
    MissingSchema,
    /// The component does not validate against its schema.
    ComponentSchemaInvalid,
    /// A file in the product that the MPH does not mention.
    Unreferenced,
}

impl FindingKind {
    pub fn level(self) -> Level {
        match self {
            Self::Unreferenced => Level::Warning,
            _ => Level::Error,
        }
    }
}

/// One problem found in a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: FindingKind,
    /// Product-relative file the finding is about, if any.
    pub file: Option<PathBuf>,
    pub message: String,
}

impl Finding {
    pub fn level(&self) -> Level {
        self.kind.level()
    }
}

/// Everything learned about a product that passed the structural checks.
#[derive(Debug, Clone)]
pub struct ProductReport {
    root: PathBuf,
    findings: Vec<Finding>,
    claimed_components: Vec<PathBuf>,
    claimed_schemas: Vec<PathBuf>,
    unreferenced: Vec<PathBuf>,
}

impl ProductReport {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            findings: Vec::new(),
            claimed_components: Vec::new(),
            claimed_schemas: Vec::new(),
            unreferenced: Vec::new(),
        }
    }

    /// Record and log a finding.
    fn record(&mut self, kind: FindingKind, file: Option<&Path>, message: String) {
        let product = self.root.display();
        let file_field = file.map(|f| f.display().to_string()).unwrap_or_default();
        match kind.level() {
            Level::Error => tracing::error!(product = %product, file = %file_field, "{message}"),
            Level::Warning => tracing::warn!(product = %product, file = %file_field, "{message}"),
        }
        self.findings.push(Finding {
            kind,
            file: file.map(Path::to_path_buf),
            message,
        });
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All findings in the order they were made.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.level() == Level::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.level() == Level::Warning)
    }

    /// Files claimed by MPH component entries.
    pub fn claimed_components(&self) -> &[PathBuf] {
        &self.claimed_components
    }

    /// Files claimed as component schemas.
    pub fn claimed_schemas(&self) -> &[PathBuf] {
        &self.claimed_schemas
    }

    /// Files the MPH does not account for.
    pub fn unreferenced(&self) -> &[PathBuf] {
        &self.unreferenced
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_counts(self.errors().count(), self.warnings().count())
    }
}

/// Result of checking one product.
#[derive(Debug)]
pub enum ProductOutcome {
    /// The check stopped before reconciliation.
    StructuralFailure(StructuralFailure),
    /// The check ran to completion.
    Checked(ProductReport),
}

impl ProductOutcome {
    pub fn verdict(&self) -> Verdict {
        match self {
            Self::StructuralFailure(_) => Verdict::StructuralFailure,
            Self::Checked(report) => report.verdict(),
        }
    }

    pub fn report(&self) -> Option<&ProductReport> {
        match self {
            Self::Checked(report) => Some(report),
            Self::StructuralFailure(_) => None,
        }
    }
}

/// Runs the consistency check on products.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductChecker {
    options: CheckOptions,
    validator: SchemaValidator,
}

impl ProductChecker {
    pub fn new(options: CheckOptions) -> Self {
        Self {
            options,
            validator: SchemaValidator::new(options.remote_imports),
        }
    }

    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    /// Check the product rooted at `root`.
    pub fn check(&self, root: &Path) -> ProductOutcome {
        match self.reconcile(root) {
            Ok(report) => {
                tracing::debug!(
                    product = %root.display(),
                    verdict = %report.verdict(),
                    "product checked"
                );
                ProductOutcome::Checked(report)
            }
            Err(failure) => {
                failure.log();
                ProductOutcome::StructuralFailure(failure)
            }
        }
    }

    fn reconcile(&self, root: &Path) -> Result<ProductReport, StructuralFailure> {
        if !root.exists() {
            return Err(StructuralFailure::MissingProduct(root.to_path_buf()));
        }
        let name = product_name(root).ok_or_else(|| StructuralFailure::UnnamedProduct(root.to_path_buf()))?;

        let manifest_key = PathBuf::from(format!("{}.xml", name.to_lowercase()));
        let manifest_path = root.join(&manifest_key);
        if !manifest_path.exists() {
            return Err(StructuralFailure::MissingManifest(manifest_path));
        }

        let mut report = ProductReport::new(root);

        if self.options.verify_manifest_schema {
            let validation = self.validator.validate(&manifest_path, &SchemaSource::builtin_mph());
            validation.log();
            if !validation.is_valid() {
                report.record(
                    FindingKind::ManifestSchemaInvalid,
                    Some(&manifest_key),
                    format!(
                        "MPH '{}' is not valid according to the {}",
                        manifest_path.display(),
                        validation.schema()
                    ),
                );
            }
        }

        let manifest = Manifest::parse_file(&manifest_path).map_err(|source| {
            StructuralFailure::UnparsableManifest {
                path: manifest_path.clone(),
                source,
            }
        })?;

        check_processing_date(&name, &manifest, &mut report);

        let mut inventory = Inventory::scan(root);
        for unlisted in inventory.unlisted() {
            report.record(
                FindingKind::UnreadableDirectory,
                Some(&unlisted.path),
                format!(
                    "could not list '{}' in product '{}' ({})",
                    root.join(&unlisted.path).display(),
                    root.display(),
                    unlisted.reason
                ),
            );
        }
        inventory.exclude(&manifest_key);
        tracing::debug!(
            product = %root.display(),
            files = inventory.len(),
            components = manifest.components().len(),
            "listed product files"
        );

        for descriptor in manifest.components() {
            self.check_component(&name, descriptor, &mut inventory, &mut report);
        }

        for file in inventory.into_remaining() {
            report.record(
                FindingKind::Unreferenced,
                Some(&file),
                format!(
                    "file '{}' found in product '{}' but not included in MPH",
                    file.display(),
                    root.display()
                ),
            );
            report.unreferenced.push(file);
        }

        Ok(report)
    }

    fn check_component(
        &self,
        name: &str,
        descriptor: &ComponentDescriptor,
        inventory: &mut Inventory,
        report: &mut ProductReport,
    ) {
        let product = inventory.root().display().to_string();

        let Some(href) = descriptor.href.as_deref() else {
            report.record(
                FindingKind::MissingHref,
                None,
                format!(
                    "MPH component on line {} has no file reference in product '{product}'",
                    descriptor.line
                ),
            );
            return;
        };
        if href == name {
            return;
        }

        let key = match Inventory::resolve(href) {
            Some(key) if inventory.claim(&key) => key,
            _ => {
                report.record(
                    FindingKind::MissingReference,
                    Some(Path::new(href)),
                    format!("MPH reference '{href}' does not exist in product '{product}'"),
                );
                return;
            }
        };
        report.claimed_components.push(key.clone());
        let component_path = inventory.path_of(&key);

        check_size(descriptor, href, &key, &component_path, report);

        let Some(schema_ref) = descriptor.schema_ref.as_deref() else {
            return;
        };
        let schema_key = match Inventory::resolve(schema_ref) {
            Some(schema_key) if inventory.claim(&schema_key) => schema_key,
            _ => {
                report.record(
                    FindingKind::MissingSchema,
                    Some(Path::new(schema_ref)),
                    format!(
                        "schema file '{}' does not exist",
                        inventory.root().join(schema_ref).display()
                    ),
                );
                return;
            }
        };
        report.claimed_schemas.push(schema_key.clone());

        let schema = SchemaSource::File(inventory.path_of(&schema_key));
        let validation = self.validator.validate(&component_path, &schema);
        validation.log();
        if !validation.is_valid() {
            report.record(
                FindingKind::ComponentSchemaInvalid,
                Some(&key),
                format!("file '{href}' is not valid according to schema '{schema_ref}'"),
            );
        }
    }
}

/// Check one product with an explicit validator, e.g. one whose remote
/// import policy differs from `options`.
pub fn verify_product(root: &Path, options: &CheckOptions, validator: &SchemaValidator) -> ProductOutcome {
    ProductChecker {
        options: *options,
        validator: *validator,
    }
    .check(root)
}

/// Compare the declared `eop:size` of a claimed component with its length.
fn check_size(
    descriptor: &ComponentDescriptor,
    href: &str,
    key: &Path,
    component_path: &Path,
    report: &mut ProductReport,
) {
    let product = report.root.display().to_string();
    let declared = match descriptor.declared_size() {
        None => return,
        Some(Ok(declared)) => declared,
        Some(Err(e)) => {
            report.record(
                FindingKind::InvalidSize,
                Some(key),
                format!(
                    "invalid file size '{}' in MPH for '{href}' in product '{product}' ({e})",
                    descriptor.size.as_deref().unwrap_or_default().trim()
                ),
            );
            return;
        }
    };
    match std::fs::metadata(component_path) {
        Ok(metadata) if metadata.len() != declared => report.record(
            FindingKind::SizeMismatch,
            Some(key),
            format!(
                "file size for '{href}' ({}) does not match file size in MPH ({declared}) for product '{product}'",
                metadata.len()
            ),
        ),
        Ok(_) => {}
        Err(e) => report.record(
            FindingKind::UnreadableSize,
            Some(key),
            format!("could not determine file size of '{href}' in product '{product}': {e}"),
        ),
    }
}

/// Compare the MPH processing date with the compact date in the product name.
fn check_processing_date(name: &str, manifest: &Manifest, report: &mut ProductReport) {
    let mph = manifest.path().display().to_string();
    let Some(mph_date) = manifest.processing_date() else {
        report.record(
            FindingKind::MissingProcessingDate,
            None,
            format!("no processingDate found in '{mph}'"),
        );
        return;
    };

    let compact_mph_date = match ProcessingDate::parse(mph_date)
        .map_err(|e| e.to_string())
        .and_then(|date| CompactDate::from_processing_date(&date).map_err(|e| e.to_string()))
    {
        Ok(compact) => compact,
        Err(reason) => {
            report.record(
                FindingKind::InvalidProcessingDate,
                None,
                format!("invalid value for processingDate in '{mph}' ({reason})"),
            );
            return;
        }
    };

    let compact_creation_date = CompactDate::from_product_name(name);
    if compact_creation_date == compact_mph_date {
        return;
    }

    let creation_date = match compact_creation_date.to_processing_date() {
        Ok(date) => date.to_string(),
        Err(e) => format!("invalid: {e}"),
    };
    report.record(
        FindingKind::DateMismatch,
        None,
        format!(
            "compact creation date in '{}' ({creation_date}|{compact_creation_date}) does not match \
             processing date from MPH ({mph_date}|{compact_mph_date})",
            report.root.display()
        ),
    );
}

/// The final name component of a product path, resolving `.` and the like.
fn product_name(root: &Path) -> Option<String> {
    let name = match root.file_name() {
        Some(name) => name.to_os_string(),
        None => root.canonicalize().ok()?.file_name()?.to_os_string(),
    };
    Some(name.to_string_lossy().into_owned())
}
