// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-QTO Model - Boundary traits and shared types for quantity take-off
//!
//! This crate defines the seams between the take-off engine and the systems it
//! depends on. Backends that load building models implement the accessor
//! traits; backends that compute solid volumes implement [`VolumeEvaluator`].
//!
//! # Architecture
//!
//! - [`ModelLoader`] - Opens one model file and returns an [`IfcModel`]
//! - [`IfcModel`] - Read-only access to one loaded model
//! - [`EntityResolver`] - Entity lookup and reference resolution
//! - [`PropertyReader`] - Property sets and quantity sets attached to entities
//! - [`VolumeEvaluator`] - Volume derivation from solid representations
//!
//! # Example
//!
//! ```ignore
//! use ifc_qto_model::{IfcType, ModelLoader};
//!
//! let model = loader.load(path)?;
//! for beam in model.resolver().entities_by_type(&IfcType::IfcBeam) {
//!     for qty in model.properties().quantities(beam.id)? {
//!         println!("{} {}: {}", beam.id, qty.name, qty.formatted());
//!     }
//! }
//! ```

pub mod error;
pub mod geometry;
pub mod properties;
pub mod resolver;
pub mod traits;
pub mod types;

pub use error::*;
pub use geometry::*;
pub use properties::*;
pub use resolver::*;
pub use traits::*;
pub use types::*;
