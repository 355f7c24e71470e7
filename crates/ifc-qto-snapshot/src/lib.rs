// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-QTO Snapshot - Model backend over decoded entity snapshots
//!
//! A snapshot is a JSON document holding a model's header metadata and its
//! already-decoded entities (type name plus positional attributes). This
//! crate indexes such documents and serves them through the traits defined
//! in `ifc-qto-model`; decoding the original exchange file is left to the
//! exporter that produced the snapshot.
//!
//! # Example
//!
//! ```ignore
//! use ifc_qto_snapshot::SnapshotLoader;
//! use ifc_qto_model::ModelLoader;
//!
//! let model = SnapshotLoader::new().load(Path::new("tower-a.json"))?;
//! let beams = model.resolver().find_by_type_name("IFCBEAM");
//! println!("Found {} beams", beams.len());
//! ```

mod builder;
mod model;
mod properties;
mod resolver;
mod units;

pub use builder::SnapshotBuilder;
pub use model::{SnapshotDocument, SnapshotModel};
pub use properties::PropertyReaderImpl;
pub use resolver::ResolverImpl;

use ifc_qto_model::{IfcModel, ModelLoader, Result};
use std::path::Path;
use std::sync::Arc;

/// Loader for `.json` entity snapshots implementing `ModelLoader`
#[derive(Clone, Debug)]
pub struct SnapshotLoader {
    extension: String,
}

impl SnapshotLoader {
    /// Create a loader for `.json` files
    pub fn new() -> Self {
        Self {
            extension: "json".to_string(),
        }
    }

    /// Accept a different file extension (without the dot)
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }
}

impl Default for SnapshotLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelLoader for SnapshotLoader {
    fn load(&self, path: &Path) -> Result<Arc<dyn IfcModel>> {
        let content = std::fs::read_to_string(path)?;
        let model = SnapshotModel::from_json(&content)?;
        log::debug!(
            "loaded {} ({} entities, schema {})",
            path.display(),
            model.resolver().entity_count(),
            model.metadata().schema_version
        );
        Ok(Arc::new(model))
    }

    fn accepts_extension(&self, extension: &str) -> bool {
        extension.eq_ignore_ascii_case(&self.extension)
    }
}

/// Quick load function for simple use cases
pub fn load(path: &Path) -> Result<Arc<dyn IfcModel>> {
    SnapshotLoader::new().load(path)
}
