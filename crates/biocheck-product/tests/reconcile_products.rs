//! Integration tests: build BIOMASS products in a temporary directory and
//! check them end to end.
//!
//! The fixture product is `PRODUCT_ABC123`. `ABC123` in base 36 is
//! 623 698 779 seconds after 2000-01-01, i.e. 2019-10-06T17:39:39Z.

use std::path::{Path, PathBuf};

use biocheck_core::{aggregate, ExitStatus, Severity, Verdict};
use biocheck_product::{
    verify_product, CheckOptions, FindingKind, ProductChecker, ProductOutcome, StructuralFailure,
};
use biocheck_schema::{RemoteImports, SchemaValidator};

const PRODUCT: &str = "PRODUCT_ABC123";
const PROCESSING_DATE: &str = "2019-10-06T17:39:39Z";

/// One `bio:ProductInformation` entry of a fixture MPH.
struct Entry<'a> {
    href: &'a str,
    size: Option<&'a str>,
    rds: Option<&'a str>,
}

impl<'a> Entry<'a> {
    fn file(href: &'a str) -> Self {
        Self { href, size: None, rds: None }
    }

    fn sized(href: &'a str, size: &'a str) -> Self {
        Self { href, size: Some(size), rds: None }
    }

    fn with_schema(mut self, rds: &'a str) -> Self {
        self.rds = Some(rds);
        self
    }
}

fn mph(processing_date: &str, entries: &[Entry<'_>]) -> String {
    let mut products = String::new();
    for entry in entries {
        products.push_str("    <eop:product>\n      <bio:ProductInformation>\n");
        products.push_str(&format!(
            "        <eop:fileName><ows:ServiceReference xlink:href=\"{}\"/></eop:fileName>\n",
            entry.href
        ));
        if let Some(size) = entry.size {
            products.push_str(&format!("        <eop:size uom=\"bytes\">{size}</eop:size>\n"));
        }
        if let Some(rds) = entry.rds {
            products.push_str(&format!("        <bio:rds>{rds}</bio:rds>\n"));
        }
        products.push_str("      </bio:ProductInformation>\n    </eop:product>\n");
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<bio:EarthObservation xmlns:bio="http://earth.esa.int/biomass/1.0"
    xmlns:eop="http://www.opengis.net/eop/2.1"
    xmlns:ows="http://www.opengis.net/ows/2.0"
    xmlns:xlink="http://www.w3.org/1999/xlink">
  <eop:metaDataProperty>
    <bio:EarthObservationMetaData>
      <eop:processing>
        <bio:ProcessingInformation>
          <eop:processingDate>{processing_date}</eop:processingDate>
        </bio:ProcessingInformation>
      </eop:processing>
    </bio:EarthObservationMetaData>
  </eop:metaDataProperty>
  <eop:result>
{products}  </eop:result>
</bio:EarthObservation>
"#
    )
}

const RECORD_SCHEMA: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="record">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="count" type="xs:integer"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>
"#;

/// A product directory under a temporary root.
struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Fixture {
    fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join(name);
        std::fs::create_dir(&root).unwrap();
        Self { _dir: dir, root }
    }

    /// `PRODUCT_ABC123` with a 100-byte `data.bin` declared in its MPH.
    fn standard() -> Self {
        let fixture = Self::new(PRODUCT);
        fixture.write_bytes("data.bin", 100);
        fixture.write_mph(&mph(
            PROCESSING_DATE,
            &[Entry::file(PRODUCT), Entry::sized("data.bin", "100")],
        ));
        fixture
    }

    fn write(&self, relative: &str, content: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn write_bytes(&self, relative: &str, len: usize) {
        self.write(relative, &"x".repeat(len));
    }

    fn write_mph(&self, content: &str) {
        let name = self.root.file_name().unwrap().to_string_lossy().to_lowercase();
        self.write(&format!("{name}.xml"), content);
    }

    fn check(&self) -> ProductOutcome {
        ProductChecker::default().check(&self.root)
    }
}

fn kinds(outcome: &ProductOutcome) -> Vec<FindingKind> {
    outcome
        .report()
        .expect("product should pass the structural checks")
        .findings()
        .iter()
        .map(|f| f.kind)
        .collect()
}

fn exit_code(outcomes: &[&ProductOutcome]) -> u8 {
    aggregate(outcomes.iter().map(|o| o.verdict())).exit_status().code()
}

// ---------------------------------------------------------------------------
// Whole-product verdicts
// ---------------------------------------------------------------------------

#[test]
fn test_consistent_product_is_ok() {
    let fixture = Fixture::standard();
    let outcome = fixture.check();

    assert_eq!(outcome.verdict(), Verdict::Ok, "findings: {:?}", kinds(&outcome));
    assert_eq!(exit_code(&[&outcome]), 0);
}

#[test]
fn test_size_mismatch_is_one_error() {
    let fixture = Fixture::standard();
    fixture.write_bytes("data.bin", 99);
    let outcome = fixture.check();

    assert_eq!(kinds(&outcome), vec![FindingKind::SizeMismatch]);
    let report = outcome.report().unwrap();
    let finding = &report.findings()[0];
    assert_eq!(finding.file.as_deref(), Some(Path::new("data.bin")));
    assert!(finding.message.contains("(99)"), "{}", finding.message);
    assert!(finding.message.contains("(100)"), "{}", finding.message);
    assert_eq!(outcome.verdict(), Verdict::HasErrors);
    assert_eq!(exit_code(&[&outcome]), 2);
}

#[test]
fn test_invalid_manifest_schema_does_not_hide_later_findings() {
    let fixture = Fixture::standard();
    fixture.write_bytes("data.bin", 99);
    let checker = ProductChecker::new(CheckOptions {
        verify_manifest_schema: true,
        ..CheckOptions::default()
    });

    let outcome = checker.check(&fixture.root);
    assert_eq!(
        kinds(&outcome),
        vec![FindingKind::ManifestSchemaInvalid, FindingKind::SizeMismatch]
    );
    let report = outcome.report().unwrap();
    assert_eq!(report.findings()[0].file.as_deref(), Some(Path::new("product_abc123.xml")));
    assert_eq!(exit_code(&[&outcome]), 2);
}

#[test]
fn test_extra_file_is_a_warning() {
    let fixture = Fixture::standard();
    fixture.write("extra.txt", "not in the MPH");
    let outcome = fixture.check();

    assert_eq!(kinds(&outcome), vec![FindingKind::Unreferenced]);
    assert_eq!(
        outcome.report().unwrap().unreferenced(),
        &[PathBuf::from("extra.txt")]
    );
    assert_eq!(outcome.verdict(), Verdict::HasWarningsOnly);
    assert_eq!(exit_code(&[&outcome]), 3);
}

#[test]
fn test_product_path_with_trailing_current_dir() {
    let fixture = Fixture::standard();
    let outcome = ProductChecker::default().check(&fixture.root.join("."));
    assert_eq!(outcome.verdict(), Verdict::Ok, "findings: {:?}", kinds(&outcome));
}

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

#[test]
fn test_missing_reference_does_not_stop_later_entries() {
    let fixture = Fixture::new(PRODUCT);
    fixture.write_bytes("measurement/b.dat", 10);
    fixture.write_mph(&mph(
        PROCESSING_DATE,
        &[
            Entry::file(PRODUCT),
            Entry::file("measurement/a.dat"),
            Entry::sized("measurement/b.dat", "11"),
        ],
    ));
    let outcome = fixture.check();

    assert_eq!(
        kinds(&outcome),
        vec![FindingKind::MissingReference, FindingKind::SizeMismatch]
    );
    let report = outcome.report().unwrap();
    assert!(report.findings()[0].message.contains("measurement/a.dat"));
    assert_eq!(report.claimed_components(), &[PathBuf::from("measurement/b.dat")]);
}

#[test]
fn test_reference_outside_product_is_missing() {
    let fixture = Fixture::standard();
    std::fs::write(fixture.root.parent().unwrap().join("outside.bin"), b"x").unwrap();
    fixture.write_mph(&mph(
        PROCESSING_DATE,
        &[Entry::file(PRODUCT), Entry::sized("data.bin", "100"), Entry::file("../outside.bin")],
    ));

    assert_eq!(kinds(&fixture.check()), vec![FindingKind::MissingReference]);
}

#[test]
fn test_file_listed_twice_is_claimed_once() {
    let fixture = Fixture::standard();
    fixture.write_mph(&mph(
        PROCESSING_DATE,
        &[Entry::file(PRODUCT), Entry::file("data.bin"), Entry::file("./data.bin")],
    ));

    assert_eq!(kinds(&fixture.check()), vec![FindingKind::MissingReference]);
}

#[test]
fn test_entry_without_href_is_an_error() {
    let fixture = Fixture::standard();
    let text = mph(PROCESSING_DATE, &[Entry::file(PRODUCT), Entry::sized("data.bin", "100")])
        .replace(
            "<eop:fileName><ows:ServiceReference xlink:href=\"data.bin\"/></eop:fileName>",
            "<eop:fileName/>",
        );
    fixture.write_mph(&text);

    assert_eq!(
        kinds(&fixture.check()),
        vec![FindingKind::MissingHref, FindingKind::Unreferenced]
    );
}

#[test]
fn test_non_numeric_size_is_an_error() {
    let fixture = Fixture::standard();
    fixture.write_mph(&mph(
        PROCESSING_DATE,
        &[Entry::file(PRODUCT), Entry::sized("data.bin", "one hundred")],
    ));

    assert_eq!(kinds(&fixture.check()), vec![FindingKind::InvalidSize]);
}

// ---------------------------------------------------------------------------
// Processing date
// ---------------------------------------------------------------------------

#[test]
fn test_suffix_off_by_one_second_is_one_date_mismatch() {
    let fixture = Fixture::new("PRODUCT_ABC124");
    fixture.write_mph(&mph(PROCESSING_DATE, &[Entry::file("PRODUCT_ABC124")]));
    let outcome = fixture.check();

    assert_eq!(kinds(&outcome), vec![FindingKind::DateMismatch]);
    let message = &outcome.report().unwrap().findings()[0].message;
    assert!(message.contains("2019-10-06T17:39:40Z|ABC124"), "{message}");
    assert!(message.contains("2019-10-06T17:39:39Z|ABC123"), "{message}");
}

#[test]
fn test_undecodable_suffix_is_one_date_mismatch() {
    let fixture = Fixture::new("PRODUCT_AB_123");
    fixture.write_mph(&mph(PROCESSING_DATE, &[Entry::file("PRODUCT_AB_123")]));
    let outcome = fixture.check();

    assert_eq!(kinds(&outcome), vec![FindingKind::DateMismatch]);
    let message = &outcome.report().unwrap().findings()[0].message;
    assert!(message.contains("invalid:"), "{message}");
}

#[test]
fn test_lowercase_suffix_still_mismatches() {
    let fixture = Fixture::new("PRODUCT_abc123");
    fixture.write_mph(&mph(PROCESSING_DATE, &[Entry::file("PRODUCT_abc123")]));

    assert_eq!(kinds(&fixture.check()), vec![FindingKind::DateMismatch]);
}

#[test]
fn test_invalid_processing_date() {
    let fixture = Fixture::standard();
    fixture.write_mph(&mph(
        "2019-10-06 17:39:39",
        &[Entry::file(PRODUCT), Entry::sized("data.bin", "100")],
    ));
    let outcome = fixture.check();

    assert_eq!(kinds(&outcome), vec![FindingKind::InvalidProcessingDate]);
    assert_eq!(outcome.verdict(), Verdict::HasErrors);
}

#[test]
fn test_missing_processing_date() {
    let fixture = Fixture::standard();
    let text = mph(PROCESSING_DATE, &[Entry::file(PRODUCT), Entry::sized("data.bin", "100")])
        .replace("<eop:processingDate>2019-10-06T17:39:39Z</eop:processingDate>", "");
    fixture.write_mph(&text);

    assert_eq!(kinds(&fixture.check()), vec![FindingKind::MissingProcessingDate]);
}

// ---------------------------------------------------------------------------
// Component schemas
// ---------------------------------------------------------------------------

fn schema_fixture(record: &str) -> Fixture {
    let fixture = Fixture::new(PRODUCT);
    fixture.write("schema/record.xsd", RECORD_SCHEMA);
    fixture.write("annotation/record.xml", record);
    fixture.write_mph(&mph(
        PROCESSING_DATE,
        &[
            Entry::file(PRODUCT),
            Entry::file("annotation/record.xml").with_schema("schema/record.xsd"),
        ],
    ));
    fixture
}

#[test]
fn test_component_valid_against_its_schema() {
    let fixture = schema_fixture("<record><count>3</count></record>\n");
    let outcome = fixture.check();

    assert_eq!(outcome.verdict(), Verdict::Ok, "findings: {:?}", kinds(&outcome));
    let report = outcome.report().unwrap();
    assert_eq!(report.claimed_schemas(), &[PathBuf::from("schema/record.xsd")]);
}

#[test]
fn test_component_invalid_against_its_schema() {
    let fixture = schema_fixture("<record><count>three</count></record>\n");
    let outcome = fixture.check();

    assert_eq!(kinds(&outcome), vec![FindingKind::ComponentSchemaInvalid]);
    let finding = &outcome.report().unwrap().findings()[0];
    assert_eq!(finding.file.as_deref(), Some(Path::new("annotation/record.xml")));
}

#[test]
fn test_missing_component_schema() {
    let fixture = schema_fixture("<record><count>3</count></record>\n");
    std::fs::remove_file(fixture.root.join("schema/record.xsd")).unwrap();

    assert_eq!(kinds(&fixture.check()), vec![FindingKind::MissingSchema]);
}

#[test]
fn test_shared_schema_is_claimed_by_first_user_only() {
    let fixture = Fixture::new(PRODUCT);
    fixture.write("schema/record.xsd", RECORD_SCHEMA);
    fixture.write("annotation/a.xml", "<record><count>1</count></record>\n");
    fixture.write("annotation/b.xml", "<record><count>2</count></record>\n");
    fixture.write_mph(&mph(
        PROCESSING_DATE,
        &[
            Entry::file(PRODUCT),
            Entry::file("annotation/a.xml").with_schema("schema/record.xsd"),
            Entry::file("annotation/b.xml").with_schema("schema/record.xsd"),
        ],
    ));

    assert_eq!(kinds(&fixture.check()), vec![FindingKind::MissingSchema]);
}

#[test]
fn test_remote_import_refused_under_reject_policy() {
    let fixture = schema_fixture("<record><count>3</count></record>\n");
    fixture.write(
        "schema/record.xsd",
        &RECORD_SCHEMA.replace(
            "<xs:element name=\"record\">",
            "<xs:import namespace=\"urn:remote\" schemaLocation=\"https://example.org/remote.xsd\"/>\n  <xs:element name=\"record\">",
        ),
    );
    let options = CheckOptions {
        remote_imports: RemoteImports::Reject,
        ..CheckOptions::default()
    };

    let outcome = verify_product(&fixture.root, &options, &SchemaValidator::new(RemoteImports::Reject));
    assert_eq!(kinds(&outcome), vec![FindingKind::ComponentSchemaInvalid]);
}

// ---------------------------------------------------------------------------
// Inventory partition
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_an_error_and_the_check_goes_on() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = Fixture::standard();
    fixture.write_bytes("data.bin", 99);
    fixture.write("locked/inner.txt", "x");
    let locked = fixture.root.join("locked");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
    let denied = std::fs::read_dir(&locked).is_err();

    let outcome = fixture.check();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
    if !denied {
        // Permission bits do not bind this user (root).
        return;
    }

    assert_eq!(
        kinds(&outcome),
        vec![FindingKind::UnreadableDirectory, FindingKind::SizeMismatch]
    );
    let report = outcome.report().unwrap();
    assert_eq!(report.findings()[0].file.as_deref(), Some(Path::new("locked")));
    assert!(report.unreferenced().is_empty());
    assert_eq!(outcome.verdict(), Verdict::HasErrors);
}

#[test]
fn test_every_file_lands_in_exactly_one_bucket() {
    let fixture = schema_fixture("<record><count>3</count></record>\n");
    fixture.write_bytes("data.bin", 100);
    fixture.write("extra/one.txt", "1");
    fixture.write("two.txt", "2");

    let outcome = fixture.check();
    let report = outcome.report().unwrap();

    let mut all: Vec<PathBuf> = report
        .claimed_components()
        .iter()
        .chain(report.claimed_schemas())
        .chain(report.unreferenced())
        .cloned()
        .collect();
    let total = all.len();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), total, "a file was counted twice");
    assert_eq!(
        all,
        vec![
            PathBuf::from("annotation/record.xml"),
            PathBuf::from("data.bin"),
            PathBuf::from("extra/one.txt"),
            PathBuf::from("schema/record.xsd"),
            PathBuf::from("two.txt"),
        ]
    );
    assert_eq!(report.warnings().count(), 3);
}

// ---------------------------------------------------------------------------
// Structural failures
// ---------------------------------------------------------------------------

#[test]
fn test_missing_product_is_structural() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = ProductChecker::default().check(&dir.path().join(PRODUCT));

    assert!(matches!(
        outcome,
        ProductOutcome::StructuralFailure(StructuralFailure::MissingProduct(_))
    ));
    assert_eq!(exit_code(&[&outcome]), 2);
}

#[test]
fn test_missing_manifest_is_structural() {
    let fixture = Fixture::new(PRODUCT);
    fixture.write_bytes("data.bin", 100);

    match fixture.check() {
        ProductOutcome::StructuralFailure(StructuralFailure::MissingManifest(path)) => {
            assert_eq!(path, fixture.root.join("product_abc123.xml"));
        }
        other => panic!("expected a missing MPH, got {other:?}"),
    }
}

#[test]
fn test_malformed_manifest_is_structural() {
    let fixture = Fixture::new(PRODUCT);
    fixture.write_mph("<bio:EarthObservation>\n<unclosed>\n");

    let outcome = fixture.check();
    assert!(matches!(
        outcome,
        ProductOutcome::StructuralFailure(StructuralFailure::UnparsableManifest { .. })
    ));
    assert_eq!(outcome.verdict(), Verdict::StructuralFailure);
}

// ---------------------------------------------------------------------------
// Several products
// ---------------------------------------------------------------------------

#[test]
fn test_worst_product_decides_the_run() {
    let ok = Fixture::standard();
    let warned = Fixture::standard();
    warned.write("extra.txt", "x");
    let failed = Fixture::standard();
    failed.write_bytes("data.bin", 1);

    let checker = ProductChecker::new(CheckOptions::default());
    let outcomes: Vec<ProductOutcome> = [&ok, &warned, &failed]
        .iter()
        .map(|f| checker.check(&f.root))
        .collect();

    assert_eq!(aggregate(outcomes.iter().map(ProductOutcome::verdict)), Severity::Error);
    assert_eq!(
        aggregate(outcomes[..2].iter().map(ProductOutcome::verdict)).exit_status(),
        ExitStatus::Warnings
    );
}
