// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON report
//!
//! Measured values are JSON numbers; anything else is the sentinel string
//! the text and CSV reports use for the same field.

use super::{aggregate_cells, not_supported, AggregateCell, ERROR, NOT_FOUND, UNAVAILABLE};
use crate::aggregate::grand_total;
use crate::batch::{BatchResult, FileReport, FileStatus};
use crate::compliance::FieldValue;
use crate::error::Result;
use crate::quantity::QuantityKind;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::io::Write;

fn field_json<T: Serialize>(field: &FieldValue<T>) -> Value {
    match field {
        FieldValue::Present(value) => json!(value),
        FieldValue::NotFound => json!(NOT_FOUND),
        FieldValue::Unavailable => json!(UNAVAILABLE),
        FieldValue::Unsupported(schema) => json!(not_supported(schema)),
    }
}

/// Aggregate object whose numbers could not be reported
fn sentinel_aggregate(type_tag: &str, kind: QuantityKind, sentinel: &str) -> Value {
    json!({
        "type_tag": type_tag,
        "kind": kind,
        "sum": sentinel,
        "contributing": sentinel,
        "measured": sentinel,
        "estimated": sentinel,
        "unavailable": sentinel,
    })
}

fn file_json(file: &FileReport, result: &BatchResult) -> Value {
    let mut object = Map::new();
    object.insert("file".into(), json!(file.file_name()));
    object.insert("path".into(), json!(file.path.display().to_string()));
    object.insert(
        "schema".into(),
        json!(file.schema.as_deref().unwrap_or(UNAVAILABLE)),
    );

    let Some(compliance) = &file.compliance else {
        match &file.status {
            FileStatus::Failed(message) => {
                object.insert("status".into(), json!(ERROR));
                object.insert("error".into(), json!(message));
            }
            FileStatus::Skipped => {
                object.insert("status".into(), json!("skipped"));
            }
            FileStatus::Completed => {
                object.insert("status".into(), json!("ok"));
            }
        }
        return Value::Object(object);
    };

    let categories: Map<String, Value> = compliance
        .categories
        .iter()
        .map(|c| (c.category.clone(), field_json(&c.count)))
        .collect();

    object.insert("status".into(), json!("ok"));
    object.insert("project_count".into(), field_json(&compliance.project_count));
    object.insert("building_count".into(), field_json(&compliance.building_count));
    object.insert("storey_count".into(), field_json(&compliance.storey_count));
    object.insert("space_count".into(), field_json(&compliance.space_count));
    object.insert(
        "spaces_compliant".into(),
        json!(compliance.spaces_compliant()),
    );
    object.insert("latitude".into(), field_json(&compliance.latitude));
    object.insert("longitude".into(), field_json(&compliance.longitude));
    object.insert("elevation".into(), field_json(&compliance.elevation));
    object.insert("address".into(), field_json(&compliance.address));
    object.insert("disciplines".into(), field_json(&compliance.disciplines));
    object.insert("categories".into(), Value::Object(categories));
    object.insert("unsupported".into(), json!(compliance.unsupported));
    let aggregates: Vec<Value> = aggregate_cells(file, result)
        .into_iter()
        .map(|(type_tag, kind, cell)| match cell {
            AggregateCell::Record(record) => json!(record),
            AggregateCell::Unsupported(sentinel) => sentinel_aggregate(type_tag, kind, &sentinel),
            AggregateCell::Missing => sentinel_aggregate(type_tag, kind, UNAVAILABLE),
        })
        .collect();
    object.insert("aggregates".into(), Value::Array(aggregates));
    object.insert("quantities".into(), json!(file.quantities));
    Value::Object(object)
}

/// Build the JSON document for a batch
pub fn to_json(result: &BatchResult) -> Value {
    let grand_totals: Map<String, Value> = result
        .spec
        .quantity_kinds
        .iter()
        .map(|kind| (kind.to_string(), json!(grand_total(&result.totals, *kind))))
        .collect();

    json!({
        "spec": result.spec.name,
        "files": result.files.iter().map(|f| file_json(f, result)).collect::<Vec<_>>(),
        "totals": result.totals,
        "grand_totals": grand_totals,
        "completed": result.completed(),
        "failed": result.failed(),
    })
}

/// Write the JSON report to `writer`, pretty printed
pub fn write_json<W: Write>(result: &BatchResult, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, &to_json(result))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::{sample, with_unsupported_type};

    #[test]
    fn test_values_and_sentinels() {
        let doc = to_json(&sample());
        let a = &doc["files"][0];
        assert_eq!(a["file"], "a.json");
        assert_eq!(a["schema"], "IFC4");
        assert_eq!(a["project_count"], 1);
        assert_eq!(a["space_count"], 1);
        assert_eq!(a["spaces_compliant"], false);
        assert_eq!(a["latitude"], 45.5);
        assert_eq!(a["longitude"], "unavailable");
        assert_eq!(a["elevation"], "not found");
        assert_eq!(a["disciplines"], json!(["Architecture", "Structure"]));
        assert_eq!(a["categories"]["IfcSpecification"], "not supported by schema IFC4");
        assert_eq!(a["unsupported"][0]["field"], "IfcSpecification");
        assert_eq!(a["aggregates"][0]["kind"], "volume");
    }

    #[test]
    fn test_failed_file_and_totals() {
        let doc = to_json(&sample());
        let b = &doc["files"][1];
        assert_eq!(b["status"], "error");
        assert_eq!(b["error"], "unexpected end of input");
        assert!(b.get("latitude").is_none());

        assert_eq!(doc["totals"][0]["type_tag"], "IfcBeam");
        assert_eq!(doc["totals"][0]["sum"], 16.0);
        assert_eq!(doc["totals"][0]["measured"], 3);
        assert_eq!(doc["grand_totals"]["volume"], 16.0);
        assert_eq!(doc["failed"], 1);
    }

    #[test]
    fn test_write_json_parses_back() {
        let mut buffer = Vec::new();
        write_json(&sample(), &mut buffer).unwrap();
        let parsed: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed, to_json(&sample()));
    }

    #[test]
    fn test_unsupported_type_aggregate() {
        let doc = to_json(&with_unsupported_type());
        let aggregates = doc["files"][0]["aggregates"].as_array().unwrap();
        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates[0]["sum"], 16.0);
        let road = &aggregates[1];
        assert_eq!(road["type_tag"], "IfcRoad");
        assert_eq!(road["kind"], "volume");
        assert_eq!(road["sum"], "not supported by schema IFC4");
        assert_eq!(road["measured"], "not supported by schema IFC4");
    }
}
