// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Report emitters
//!
//! All three formats share the same field order and the same sentinel
//! strings, so a value reads the same whichever report it comes from.

mod csv;
mod json;
mod text;

pub use self::csv::{csv_header, write_csv};
pub use self::json::{to_json, write_json};
pub use self::text::{render_text, write_text};

use crate::aggregate::AggregateRecord;
use crate::batch::{BatchResult, FileReport};
use crate::compliance::FieldValue;
use crate::error::Result;
use crate::quantity::QuantityKind;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// No entity carries the value
pub const NOT_FOUND: &str = "not found";
/// The entity exists but the value could not be determined
pub const UNAVAILABLE: &str = "unavailable";
/// The file could not be processed
pub const ERROR: &str = "error";
/// Nothing to report, used where a cell must not stay blank
pub const NONE: &str = "none";

/// Sentinel for a field the schema cannot express
pub fn not_supported(schema: &str) -> String {
    format!("not supported by schema {}", schema)
}

/// Output format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReportFormat {
    Text,
    Csv,
    Json,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 3] = [ReportFormat::Text, ReportFormat::Csv, ReportFormat::Json];

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

/// Write one report per format into `dir` as `<stem>.<ext>`
pub fn write_reports(
    result: &BatchResult,
    dir: &Path,
    stem: &str,
    formats: &[ReportFormat],
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(formats.len());
    for format in formats {
        let path = dir.join(format!("{}.{}", stem, format.extension()));
        let writer = BufWriter::new(File::create(&path)?);
        match format {
            ReportFormat::Text => write_text(result, writer)?,
            ReportFormat::Csv => write_csv(result, writer)?,
            ReportFormat::Json => write_json(result, writer)?,
        }
        log::info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Render a field with `present` for values and sentinels otherwise
fn field_text<T>(field: &FieldValue<T>, present: impl FnOnce(&T) -> String) -> String {
    match field {
        FieldValue::Present(value) => present(value),
        FieldValue::NotFound => NOT_FOUND.to_string(),
        FieldValue::Unavailable => UNAVAILABLE.to_string(),
        FieldValue::Unsupported(schema) => not_supported(schema),
    }
}

/// What a file reports for one tracked type and kind
enum AggregateCell<'a> {
    Record(&'a AggregateRecord),
    /// Sentinel naming the schema that lacks the type
    Unsupported(String),
    Missing,
}

/// Quantity cells of a completed file, in tracked type then kind order
///
/// Every report walks these, so a type the schema lacks reads as
/// unsupported everywhere and never as a zero total.
fn aggregate_cells<'a>(
    file: &'a FileReport,
    result: &'a BatchResult,
) -> Vec<(&'a str, QuantityKind, AggregateCell<'a>)> {
    let Some(compliance) = &file.compliance else {
        return Vec::new();
    };
    let spec = &result.spec;
    let mut cells = Vec::with_capacity(spec.tracked_types.len() * spec.quantity_kinds.len());
    for type_tag in &spec.tracked_types {
        let reason = compliance
            .unsupported
            .iter()
            .find(|u| u.field.eq_ignore_ascii_case(type_tag))
            .map(|u| not_supported(&u.reason));
        for kind in &spec.quantity_kinds {
            let cell = match &reason {
                Some(reason) => AggregateCell::Unsupported(reason.clone()),
                None => file
                    .aggregates
                    .iter()
                    .find(|r| r.type_tag.eq_ignore_ascii_case(type_tag) && r.kind == *kind)
                    .map_or(AggregateCell::Missing, AggregateCell::Record),
            };
            cells.push((type_tag.as_str(), *kind, cell));
        }
    }
    cells
}

/// Fixed-precision quantity used in text and CSV
fn quantity_text(value: f64) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::aggregate::AggregateRecord;
    use crate::batch::{BatchResult, FileReport, FileStatus};
    use crate::compliance::{CategoryCount, ComplianceResult, FieldValue};
    use crate::quantity::QuantityKind;
    use crate::spec_doc::ValidationSpec;
    use std::path::PathBuf;

    /// One completed file with 16.0 m3 of beams and one file that failed to open
    pub fn sample() -> BatchResult {
        let spec = ValidationSpec {
            tracked_types: vec!["IfcBeam".into()],
            required_categories: vec!["IfcSpecification".into()],
            ..Default::default()
        };
        let mut beams = AggregateRecord::new("IfcBeam", QuantityKind::Volume);
        beams.sum = 16.0;
        beams.contributing = 5;
        beams.measured = 3;
        beams.estimated = 2;

        let compliance = ComplianceResult {
            schema: "IFC4".into(),
            project_count: FieldValue::Present(1),
            building_count: FieldValue::Present(1),
            storey_count: FieldValue::Present(3),
            space_count: FieldValue::Present(1),
            min_spaces: 2,
            latitude: FieldValue::Present(45.5),
            longitude: FieldValue::Unavailable,
            elevation: FieldValue::NotFound,
            address: FieldValue::Present("Rua do Ouro 20, Lisboa".into()),
            disciplines: FieldValue::Present(vec!["Architecture".into(), "Structure".into()]),
            categories: vec![CategoryCount {
                category: "IfcSpecification".into(),
                count: FieldValue::Unsupported("IFC4".into()),
            }],
            unsupported: vec![crate::support::UnsupportedField {
                field: "IfcSpecification".into(),
                reason: "IFC4".into(),
            }],
        };

        BatchResult {
            spec,
            files: vec![
                FileReport {
                    path: PathBuf::from("models/a.json"),
                    schema: Some("IFC4".into()),
                    status: FileStatus::Completed,
                    compliance: Some(compliance),
                    quantities: Vec::new(),
                    aggregates: vec![beams.clone()],
                },
                FileReport {
                    path: PathBuf::from("models/b.json"),
                    schema: None,
                    status: FileStatus::Failed("unexpected end of input".into()),
                    compliance: None,
                    quantities: Vec::new(),
                    aggregates: Vec::new(),
                },
            ],
            totals: vec![beams],
        }
    }

    /// `sample` also tracking IfcRoad, which IFC4 lacks
    pub fn with_unsupported_type() -> BatchResult {
        let mut result = sample();
        result.spec.tracked_types.push("IfcRoad".into());
        if let Some(compliance) = result.files[0].compliance.as_mut() {
            compliance.unsupported.push(crate::support::UnsupportedField {
                field: "IfcRoad".into(),
                reason: "IFC4".into(),
            });
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_sentinels() {
        let show = |v: &f64| format!("{:.6}", v);
        assert_eq!(field_text(&FieldValue::Present(45.5), show), "45.500000");
        assert_eq!(field_text(&FieldValue::<f64>::NotFound, show), "not found");
        assert_eq!(field_text(&FieldValue::<f64>::Unavailable, show), "unavailable");
        assert_eq!(
            field_text(&FieldValue::<f64>::Unsupported("IFC2X3".into()), show),
            "not supported by schema IFC2X3"
        );
    }

    #[test]
    fn test_quantity_text() {
        assert_eq!(quantity_text(16.0), "16.00");
        assert_eq!(quantity_text(0.126), "0.13");
    }
}
