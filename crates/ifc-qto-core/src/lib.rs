// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-QTO
//!
//! Quantity take-off and compliance checks over batches of IFC models.
//!
//! ## Overview
//!
//! - **Quantities**: volume, area and length per element, resolved through
//!   an ordered fallback chain (quantity sets, named properties, geometry,
//!   area times length) and tagged with how they were obtained
//! - **Schema support**: fields a model's schema cannot express are reported
//!   as unsupported instead of missing
//! - **Compliance**: project, building, storey and space presence, site
//!   coordinates and postal address
//! - **Batches**: files processed in parallel, each isolated from the others,
//!   with deterministic totals
//! - **Reports**: text, CSV and JSON sharing one field order and one set of
//!   sentinel strings
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_qto::{BatchRunner, ValidationSpec, report};
//! use ifc_qto_snapshot::SnapshotLoader;
//!
//! let spec = ValidationSpec::load(Path::new("spec.json"))?;
//! let result = BatchRunner::new(Arc::new(SnapshotLoader::new()), spec).run(&files)?;
//! print!("{}", report::render_text(&result));
//! ```

pub mod aggregate;
pub mod batch;
pub mod compliance;
pub mod coordinates;
pub mod error;
pub mod guard;
pub mod quantity;
pub mod report;
pub mod spec_doc;
pub mod support;

pub use aggregate::{grand_total, AggregateRecord, Totals};
pub use batch::{BatchOptions, BatchResult, BatchRunner, CancelToken, FileReport, FileStatus};
pub use compliance::{CategoryCount, ComplianceResult, ComplianceValidator, FieldValue};
pub use coordinates::{decode_dms, SiteCoordinates};
pub use error::{QtoError, Result};
pub use guard::{EvaluationFailure, GuardedEvaluator};
pub use quantity::{Confidence, QuantityKind, QuantityResolver, ResolvedQuantity, Strategy};
pub use report::ReportFormat;
pub use spec_doc::ValidationSpec;
pub use support::{filter_supported, FieldSupport, SchemaCapabilities, UnsupportedField};
