// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plain text report: one `key: value` block per file, then batch totals

use super::{aggregate_cells, field_text, quantity_text, AggregateCell, ERROR, UNAVAILABLE};
use crate::aggregate::{grand_total, AggregateRecord};
use crate::batch::{BatchResult, FileReport, FileStatus};
use crate::compliance::{ComplianceResult, FieldValue};
use crate::error::Result;
use std::fmt::Write as _;
use std::io::Write;

/// Render the whole report as a string
pub fn render_text(result: &BatchResult) -> String {
    let mut out = String::new();
    for file in &result.files {
        file_block(&mut out, file, result);
        out.push('\n');
    }
    totals_block(&mut out, result);
    out
}

/// Write the text report to `writer`
pub fn write_text<W: Write>(result: &BatchResult, mut writer: W) -> Result<()> {
    writer.write_all(render_text(result).as_bytes())?;
    writer.flush()?;
    Ok(())
}

fn presence(field: &FieldValue<usize>, expect_one: bool) -> String {
    field_text(field, |count| match *count {
        0 => "absent".to_string(),
        1 => "present".to_string(),
        n if expect_one => format!("present ({}, expected 1)", n),
        n => format!("present ({})", n),
    })
}

fn spaces(compliance: &ComplianceResult) -> String {
    field_text(&compliance.space_count, |count| {
        if compliance.spaces_compliant() {
            format!("{} spaces found", count)
        } else {
            format!("fewer than {} spaces found ({})", compliance.min_spaces, count)
        }
    })
}

fn aggregate_line(record: &AggregateRecord) -> String {
    format!(
        "{} {}: {} {} (measured {}, estimated {}, unavailable {})",
        record.type_tag,
        record.kind,
        quantity_text(record.sum),
        record.kind.unit(),
        record.measured,
        record.estimated,
        record.unavailable
    )
}

fn file_block(out: &mut String, file: &FileReport, result: &BatchResult) {
    let _ = writeln!(out, "file: {}", file.file_name());
    let _ = writeln!(out, "schema: {}", file.schema.as_deref().unwrap_or(UNAVAILABLE));

    let Some(compliance) = &file.compliance else {
        match &file.status {
            FileStatus::Failed(message) => {
                let _ = writeln!(out, "status: {}", ERROR);
                let _ = writeln!(out, "error: {}", message);
            }
            FileStatus::Skipped => {
                let _ = writeln!(out, "status: skipped");
            }
            FileStatus::Completed => {
                let _ = writeln!(out, "status: ok");
            }
        }
        return;
    };

    let _ = writeln!(out, "status: ok");
    let _ = writeln!(out, "project: {}", presence(&compliance.project_count, true));
    let _ = writeln!(out, "building: {}", presence(&compliance.building_count, true));
    let _ = writeln!(out, "storeys: {}", presence(&compliance.storey_count, false));
    let _ = writeln!(out, "spaces: {}", spaces(compliance));
    let _ = writeln!(out, "latitude: {}", field_text(&compliance.latitude, |v| format!("{:.6}", v)));
    let _ = writeln!(out, "longitude: {}", field_text(&compliance.longitude, |v| format!("{:.6}", v)));
    let _ = writeln!(out, "elevation: {}", field_text(&compliance.elevation, |v| format!("{:.2} m", v)));
    let _ = writeln!(out, "address: {}", field_text(&compliance.address, |a| a.clone()));
    let _ = writeln!(out, "disciplines: {}", field_text(&compliance.disciplines, |d| d.join(", ")));
    for category in &result.spec.required_categories {
        let value = compliance
            .category(category)
            .map(|count| presence(count, false))
            .unwrap_or_else(|| UNAVAILABLE.to_string());
        let _ = writeln!(out, "{}: {}", category, value);
    }

    if compliance.unsupported.is_empty() {
        let _ = writeln!(out, "unsupported: none");
    } else {
        let fields: Vec<String> = compliance
            .unsupported
            .iter()
            .map(|u| format!("{} ({})", u.field, u.reason))
            .collect();
        let _ = writeln!(out, "unsupported: {}", fields.join(", "));
    }

    for (type_tag, kind, cell) in aggregate_cells(file, result) {
        let line = match cell {
            AggregateCell::Record(record) => aggregate_line(record),
            AggregateCell::Unsupported(reason) => format!("{} {}: {}", type_tag, kind, reason),
            AggregateCell::Missing => format!("{} {}: {}", type_tag, kind, UNAVAILABLE),
        };
        let _ = writeln!(out, "{}", line);
    }
}

fn totals_block(out: &mut String, result: &BatchResult) {
    let _ = writeln!(
        out,
        "totals ({} files, {} completed, {} failed)",
        result.files.len(),
        result.completed(),
        result.failed()
    );
    for record in &result.totals {
        let _ = writeln!(
            out,
            "Total {} of {}: {} {}",
            record.kind,
            record.type_tag,
            quantity_text(record.sum),
            record.kind.unit()
        );
    }
    for kind in &result.spec.quantity_kinds {
        let _ = writeln!(
            out,
            "Total {}: {} {}",
            kind,
            quantity_text(grand_total(&result.totals, *kind)),
            kind.unit()
        );
    }
}
