//! # Main Product Header Parsing
//!
//! Reads the parts of a BIOMASS MPH the consistency check needs:
//!
//! ```text
//! bio:EarthObservation
//!   ... eop:processingDate                      -> processing date
//!   ... bio:ProductInformation                  -> one component each
//!         eop:fileName/ows:ServiceReference/@xlink:href
//!         eop:size                              (optional)
//!         bio:rds                               (optional schema path)
//! ```
//!
//! Optional fields that are absent are recorded as `None`; only a document
//! that is not well-formed XML fails to parse.
//!
//! MPH files are UTF-8. The `encoding` of the XML declaration is not
//! consulted, and a file with bytes that are not UTF-8 is rejected with
//! [`ManifestError::NotUtf8`].

use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use roxmltree::Node;

use crate::error::ManifestError;

pub const NS_BIO: &str = "http://earth.esa.int/biomass/1.0";
pub const NS_EOP: &str = "http://www.opengis.net/eop/2.1";
pub const NS_OWS: &str = "http://www.opengis.net/ows/2.0";
pub const NS_XLINK: &str = "http://www.w3.org/1999/xlink";

/// One `bio:ProductInformation` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    /// Path of the component relative to the product root.
    pub href: Option<String>,
    /// Raw text of `eop:size`.
    pub size: Option<String>,
    /// Path of the component's schema relative to the product root.
    pub schema_ref: Option<String>,
    /// Line of the entry in the MPH.
    pub line: u32,
}

impl ComponentDescriptor {
    /// The declared size as a byte count, if one is declared.
    pub fn declared_size(&self) -> Option<Result<u64, ParseIntError>> {
        self.size.as_deref().map(|s| s.trim().parse())
    }
}

/// The parsed Main Product Header.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    processing_date: Option<String>,
    components: Vec<ComponentDescriptor>,
}

impl Manifest {
    /// Read and parse an MPH file.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] if the file cannot be read, is not UTF-8
    /// or is not well-formed XML.
    pub fn parse_file(path: &Path) -> Result<Self, ManifestError> {
        let bytes = std::fs::read(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|source| ManifestError::NotUtf8 {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&text, path)
    }

    /// Parse MPH text; `path` is used for diagnostics only.
    pub fn parse_str(text: &str, path: &Path) -> Result<Self, ManifestError> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(text, options).map_err(|source| {
            ManifestError::Parse {
                path: path.to_path_buf(),
                line: source.pos().row,
                source,
            }
        })?;

        let processing_date = doc
            .descendants()
            .find(|n| is_element(n, NS_EOP, "processingDate"))
            .map(|n| n.text().unwrap_or_default().to_string());

        let components = doc
            .descendants()
            .filter(|n| is_element(n, NS_BIO, "ProductInformation"))
            .map(|info| ComponentDescriptor {
                href: child(info, NS_EOP, "fileName")
                    .and_then(|file_name| child(file_name, NS_OWS, "ServiceReference"))
                    .and_then(|reference| reference.attribute((NS_XLINK, "href")))
                    .map(str::to_string),
                size: child(info, NS_EOP, "size")
                    .map(|n| n.text().unwrap_or_default().to_string()),
                schema_ref: child(info, NS_BIO, "rds")
                    .and_then(|n| n.text())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
                line: doc.text_pos_at(info.range().start).row,
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            processing_date,
            components,
        })
    }

    /// Location the MPH was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Text of the first `eop:processingDate`, if any.
    pub fn processing_date(&self) -> Option<&str> {
        self.processing_date.as_deref()
    }

    /// Component entries in document order.
    pub fn components(&self) -> &[ComponentDescriptor] {
        &self.components
    }
}

fn is_element(node: &Node<'_, '_>, namespace: &str, name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(namespace)
        && node.tag_name().name() == name
}

fn child<'a, 'input>(node: Node<'a, 'input>, namespace: &str, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_element(n, namespace, name))
}
