// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core traits for model access
//!
//! These traits define how the take-off engine reaches a loaded model.

use crate::{EntityResolver, ModelMetadata, PropertyReader, Result};
use std::path::Path;
use std::sync::Arc;

/// Entry point for opening model files
///
/// One call produces one private model instance; loaders must not share
/// mutable state between the models they return.
pub trait ModelLoader: Send + Sync {
    /// Open the model stored at `path`
    fn load(&self, path: &Path) -> Result<Arc<dyn IfcModel>>;

    /// Whether this loader handles files with the given extension
    fn accepts_extension(&self, extension: &str) -> bool;
}

/// Core model interface - read-only access to one loaded model
///
/// The model is thread-safe (`Send + Sync`) so evaluator calls can be moved
/// onto guard threads.
pub trait IfcModel: Send + Sync {
    /// Get entity resolver for entity lookups and reference resolution
    fn resolver(&self) -> &dyn EntityResolver;

    /// Get property reader for accessing property sets and quantities
    fn properties(&self) -> &dyn PropertyReader;

    /// Get unit scale factor (file length units to meters)
    ///
    /// Common values:
    /// - 1.0 for meters
    /// - 0.001 for millimeters
    /// - 0.3048 for feet
    fn unit_scale(&self) -> f64;

    /// Get file metadata (schema version, originating system, etc.)
    fn metadata(&self) -> &ModelMetadata;
}
