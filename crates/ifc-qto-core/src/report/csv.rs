// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CSV report: one row per file
//!
//! Cells are never blank. A value that could not be determined holds the
//! matching sentinel, and every cell of a file that failed to open holds
//! `error`.

use super::{aggregate_cells, field_text, AggregateCell, ERROR, NONE, UNAVAILABLE};
use crate::batch::{BatchResult, FileReport, FileStatus};
use crate::error::Result;
use std::io::Write;

const FIXED_COLUMNS: [&str; 14] = [
    "file",
    "schema",
    "status",
    "error",
    "project_count",
    "building_count",
    "storey_count",
    "space_count",
    "spaces_compliant",
    "latitude",
    "longitude",
    "elevation",
    "address",
    "disciplines",
];

/// Column names for a batch: fixed fields, categories, then quantities
pub fn csv_header(result: &BatchResult) -> Vec<String> {
    let spec = &result.spec;
    let mut header: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend(spec.required_categories.iter().cloned());
    for type_tag in &spec.tracked_types {
        for kind in &spec.quantity_kinds {
            for suffix in ["total", "measured", "estimated", "unavailable"] {
                header.push(format!("{}_{}_{}", type_tag, kind, suffix));
            }
        }
    }
    header
}

/// Write the CSV report to `writer`
pub fn write_csv<W: Write>(result: &BatchResult, writer: W) -> Result<()> {
    let mut csv = ::csv::Writer::from_writer(writer);
    let header = csv_header(result);
    csv.write_record(&header)?;
    for file in &result.files {
        let row = file_row(file, result);
        debug_assert_eq!(row.len(), header.len());
        csv.write_record(&row)?;
    }
    csv.flush()?;
    Ok(())
}

fn file_row(file: &FileReport, result: &BatchResult) -> Vec<String> {
    let spec = &result.spec;
    let width = FIXED_COLUMNS.len()
        + spec.required_categories.len()
        + spec.tracked_types.len() * spec.quantity_kinds.len() * 4;

    let mut row = vec![
        file.file_name(),
        file.schema.clone().unwrap_or_else(|| UNAVAILABLE.to_string()),
    ];

    let Some(compliance) = &file.compliance else {
        let (status, error, filler) = match &file.status {
            FileStatus::Failed(message) => (ERROR, message.clone(), ERROR),
            FileStatus::Skipped => ("skipped", NONE.to_string(), UNAVAILABLE),
            FileStatus::Completed => ("ok", NONE.to_string(), UNAVAILABLE),
        };
        row.push(status.to_string());
        row.push(error);
        row.resize(width, filler.to_string());
        return row;
    };

    let count = |n: &usize| n.to_string();
    let number = |v: &f64| v.to_string();
    row.push("ok".to_string());
    row.push(NONE.to_string());
    row.push(field_text(&compliance.project_count, count));
    row.push(field_text(&compliance.building_count, count));
    row.push(field_text(&compliance.storey_count, count));
    row.push(field_text(&compliance.space_count, count));
    row.push(field_text(&compliance.space_count, |_| {
        compliance.spaces_compliant().to_string()
    }));
    row.push(field_text(&compliance.latitude, number));
    row.push(field_text(&compliance.longitude, number));
    row.push(field_text(&compliance.elevation, number));
    row.push(field_text(&compliance.address, |a| a.clone()));
    row.push(field_text(&compliance.disciplines, |d| d.join(", ")));

    for category in &spec.required_categories {
        row.push(
            compliance
                .category(category)
                .map(|c| field_text(c, count))
                .unwrap_or_else(|| UNAVAILABLE.to_string()),
        );
    }

    for (_, _, cell) in aggregate_cells(file, result) {
        match cell {
            AggregateCell::Record(r) => row.extend([
                r.sum.to_string(),
                r.measured.to_string(),
                r.estimated.to_string(),
                r.unavailable.to_string(),
            ]),
            AggregateCell::Unsupported(reason) => row.extend(std::iter::repeat(reason).take(4)),
            AggregateCell::Missing => row.extend(std::iter::repeat(UNAVAILABLE.to_string()).take(4)),
        }
    }
    row
}
