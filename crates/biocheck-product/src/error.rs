//! # Error Types
//!
//! Two kinds of failure stop the check of a product before reconciliation:
//! the MPH cannot be read as XML ([`ManifestError`]) or the product itself
//! is not in a checkable shape ([`StructuralFailure`]). Neither affects other
//! products in the same run.

use std::path::PathBuf;

use thiserror::Error;

/// The MPH document could not be loaded.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Reading the file failed.
    #[error("could not read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file contains bytes that are not UTF-8.
    #[error("'{}' is not UTF-8 encoded (MPH files must be UTF-8): {source}", path.display())]
    NotUtf8 {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The file is not well-formed XML.
    #[error("{}:{line}: {source}", path.display())]
    Parse {
        path: PathBuf,
        /// 1-based line of the syntax error.
        line: u32,
        #[source]
        source: roxmltree::Error,
    },
}

/// A condition that ends the check of one product early.
#[derive(Error, Debug)]
pub enum StructuralFailure {
    /// The product path does not exist.
    #[error("could not find '{}'", .0.display())]
    MissingProduct(PathBuf),

    /// The product path has no final name component to derive the MPH name from.
    #[error("could not determine product name of '{}'", .0.display())]
    UnnamedProduct(PathBuf),

    /// `<root>/<lowercase name>.xml` does not exist.
    #[error("could not find '{}'", .0.display())]
    MissingManifest(PathBuf),

    /// The MPH exists but could not be parsed.
    #[error("could not parse xml file '{}'", path.display())]
    UnparsableManifest {
        path: PathBuf,
        #[source]
        source: ManifestError,
    },
}

impl StructuralFailure {
    /// Emit the failure as error lines, the cause on a line of its own.
    pub fn log(&self) {
        tracing::error!("{self}");
        if let Self::UnparsableManifest { source, .. } = self {
            tracing::error!("{source}");
        }
    }
}
