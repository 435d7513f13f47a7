//! # Remote Schema References
//!
//! An XSD can pull in other schema documents through `xs:import`,
//! `xs:include` and `xs:redefine`. When `schemaLocation` is an `http(s)`
//! URL, libxml2 fetches it while compiling the schema, which blocks on the
//! network with no timeout.
//!
//! The embedded MPH schema always needs its remote imports. For schema files
//! shipped inside a product the behaviour is a caller choice expressed with
//! [`RemoteImports`]. Refusing remote imports means looking through every
//! schema libxml2 would load, so [`scan_schema`] follows local references
//! the same way libxml2 does: relative to the directory of the referencing
//! schema.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
const REFERENCE_ELEMENTS: [&str; 3] = ["import", "include", "redefine"];

/// Policy for product schemas that reference remote locations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteImports {
    /// Compile the schema and let libxml2 fetch remote references.
    #[default]
    Allow,
    /// Refuse schemas with remote references before compiling them.
    Reject,
}

/// An `xs:import`, `xs:include` or `xs:redefine` with a `schemaLocation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReference {
    /// `import`, `include` or `redefine`.
    pub element: String,
    /// The `schemaLocation` as written.
    pub location: String,
    /// 1-based line of the referencing element.
    pub line: u32,
}

impl SchemaReference {
    /// Whether the location is an `http://` or `https://` URL.
    pub fn is_remote(&self) -> bool {
        let lower = self.location.trim_start().to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    }
}

/// List every schema reference in an XSD document, in document order.
///
/// # Errors
///
/// Returns the parser error if `schema` is not well-formed XML.
pub fn schema_references(schema: &str) -> Result<Vec<SchemaReference>, roxmltree::Error> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(schema, options)?;
    let found = doc
        .descendants()
        .filter(|node| {
            node.is_element()
                && node.tag_name().namespace() == Some(XSD_NAMESPACE)
                && REFERENCE_ELEMENTS.contains(&node.tag_name().name())
        })
        .filter_map(|node| {
            let location = node.attribute("schemaLocation")?;
            Some(SchemaReference {
                element: node.tag_name().name().to_string(),
                location: location.to_string(),
                line: doc.text_pos_at(node.range().start).row,
            })
        })
        .collect();
    Ok(found)
}

/// List every `http://` or `https://` schema reference in an XSD document.
///
/// # Errors
///
/// Returns the parser error if `schema` is not well-formed XML.
pub fn remote_locations(schema: &str) -> Result<Vec<SchemaReference>, roxmltree::Error> {
    let mut found = schema_references(schema)?;
    found.retain(SchemaReference::is_remote);
    Ok(found)
}

/// A remote reference and the schema file that makes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteReference {
    pub schema: PathBuf,
    pub reference: SchemaReference,
}

/// A schema file in the reference graph that is not well-formed XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnparsableSchema {
    pub schema: PathBuf,
    /// 1-based line of the parse error.
    pub line: u32,
    pub message: String,
}

/// Result of [`scan_schema`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceScan {
    pub remote: Vec<RemoteReference>,
    pub unparsable: Vec<UnparsableSchema>,
}

impl ReferenceScan {
    /// No remote reference was found and every schema could be inspected.
    pub fn is_local_only(&self) -> bool {
        self.remote.is_empty() && self.unparsable.is_empty()
    }
}

/// Walk `schema` and every local schema it references, transitively.
///
/// Each file is read once, so reference cycles terminate. Files are decoded
/// leniently: a schema in a legacy encoding is still searched for
/// references. Files that cannot be read are skipped, as libxml2 cannot load
/// them either and so cannot reach the network through them.
pub fn scan_schema(schema: &Path) -> ReferenceScan {
    let mut scan = ReferenceScan::default();
    let mut visited = HashSet::new();
    let mut pending = VecDeque::from([schema.to_path_buf()]);

    while let Some(path) = pending.pop_front() {
        let key = path.canonicalize().unwrap_or_else(|_| path.clone());
        if !visited.insert(key) {
            continue;
        }
        let Ok(bytes) = std::fs::read(&path) else {
            tracing::debug!(schema = %path.display(), "referenced schema not readable, skipped");
            continue;
        };
        let references = match schema_references(&String::from_utf8_lossy(&bytes)) {
            Ok(references) => references,
            Err(e) => {
                scan.unparsable.push(UnparsableSchema {
                    schema: path,
                    line: e.pos().row,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let base = path.parent().unwrap_or(Path::new(""));
        for reference in references {
            if reference.is_remote() {
                scan.remote.push(RemoteReference {
                    schema: path.clone(),
                    reference,
                });
            } else {
                pending.push_back(base.join(&reference.location));
            }
        }
    }
    scan
}
