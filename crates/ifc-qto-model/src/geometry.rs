// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Volume derivation from solid representations

use crate::{DecodedEntity, IfcModel, Result};

/// Geometry evaluator interface
///
/// Computes the solid volume of a product from its shape representation.
/// Evaluation may be slow; callers are expected to guard it.
///
/// # Example
///
/// ```ignore
/// use ifc_qto_model::VolumeEvaluator;
///
/// fn report(evaluator: &dyn VolumeEvaluator, model: &dyn IfcModel, beam: &DecodedEntity) {
///     match evaluator.volume(beam, model) {
///         Ok(Some(v)) => println!("{}: {:.3} m³", beam.id, v),
///         Ok(None) => println!("{}: no solid", beam.id),
///         Err(e) => println!("{}: {}", beam.id, e),
///     }
/// }
/// ```
pub trait VolumeEvaluator: Send + Sync {
    /// Volume of `entity` in cubic meters
    ///
    /// Returns `Ok(None)` when the entity has no representation this evaluator
    /// understands, and an error when a representation exists but is broken.
    fn volume(&self, entity: &DecodedEntity, model: &dyn IfcModel) -> Result<Option<f64>>;
}
