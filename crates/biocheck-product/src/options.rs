//! Options controlling which checks run on a product.

use biocheck_schema::RemoteImports;
use serde::{Deserialize, Serialize};

/// Check configuration shared by every product of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    /// Validate the MPH against the built-in BIOMASS schema first.
    /// Needs network access for the OGC schemas it imports.
    pub verify_manifest_schema: bool,

    /// What to do with product schemas that import remote locations.
    pub remote_imports: RemoteImports,
}
