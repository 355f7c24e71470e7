// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ifc-qto`: batch quantity take-off over a directory of models
//!
//! Exits non-zero only when the run cannot start (bad specification
//! document, unreadable input directory) or reports cannot be written.
//! Models that fail to open are recorded in the reports.

mod args;
mod logging;
mod scan;

use anyhow::{Context, Result};
use args::Cli;
use clap::Parser;
use ifc_qto::{report, BatchOptions, BatchResult, BatchRunner, ReportFormat, ValidationSpec};
use ifc_qto_geometry::VolumeRouter;
use ifc_qto_snapshot::SnapshotLoader;
use std::io::Write;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let spec = match &cli.spec {
        Some(path) => ValidationSpec::load(path)
            .with_context(|| format!("cannot load specification {}", path.display()))?,
        None => ValidationSpec::default(),
    };

    let runner = runner(&cli, spec);
    let extension = runner.options().extension.clone();
    let files = scan::model_files(&cli.input, &extension)?;
    if files.is_empty() {
        tracing::warn!("no .{} files in {}", extension, cli.input.display());
    }

    let result = runner.run(&files)?;
    emit(&cli, &result)?;

    tracing::info!(
        "{} files: {} completed, {} failed",
        result.files.len(),
        result.completed(),
        result.failed()
    );
    Ok(())
}

fn runner(cli: &Cli, spec: ValidationSpec) -> BatchRunner {
    let options = BatchOptions::new()
        .with_jobs(cli.jobs)
        .with_geometry(!cli.no_geometry)
        .with_geometry_timeout(cli.geometry_timeout())
        .with_extension(cli.extension.as_str());

    let loader = SnapshotLoader::new().with_extension(options.extension.as_str());
    BatchRunner::new(Arc::new(loader), spec)
        .with_evaluator(Arc::new(VolumeRouter::with_default_processors()))
        .with_options(options)
}

fn emit(cli: &Cli, result: &BatchResult) -> Result<()> {
    let formats = cli.format.formats();
    if let Some(dir) = &cli.out {
        let written = report::write_reports(result, dir, &cli.name, &formats)
            .with_context(|| format!("cannot write reports to {}", dir.display()))?;
        for path in written {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for format in formats {
        match format {
            ReportFormat::Text => report::write_text(result, &mut out)?,
            ReportFormat::Csv => report::write_csv(result, &mut out)?,
            ReportFormat::Json => report::write_json(result, &mut out)?,
        }
        writeln!(out)?;
    }
    Ok(())
}
