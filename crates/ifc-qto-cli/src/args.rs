// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use clap::{Parser, ValueEnum};
use ifc_qto::ReportFormat;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "ifc-qto", version, about = "Quantity take-off and compliance checks for IFC models")]
pub struct Cli {
    /// Directory holding the model files
    #[arg(value_name = "INPUT_DIR")]
    pub input: PathBuf,

    /// Specification document (JSON) [default when omitted: volumes of IfcBeam, IfcColumn, IfcSlab, IfcPile; at least 2 spaces; no extra categories]
    #[arg(long, short, value_name = "PATH")]
    pub spec: Option<PathBuf>,

    /// Directory for report files; reports go to stdout when omitted
    #[arg(long, short, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Report format
    #[arg(long, short, value_enum, default_value_t = FormatArg::Text)]
    pub format: FormatArg,

    /// Base name of report files
    #[arg(long, default_value = "report")]
    pub name: String,

    /// Model file extension
    #[arg(long, default_value = "json")]
    pub extension: String,

    /// Worker threads (0 = one per core)
    #[arg(long, short, default_value_t = 0)]
    pub jobs: usize,

    /// Per-entity limit on geometry evaluation, 0 disables the limit
    #[arg(long, value_name = "MS", default_value_t = 10_000)]
    pub geometry_timeout_ms: u64,

    /// Never derive volumes from geometry
    #[arg(long)]
    pub no_geometry: bool,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Text,
    Csv,
    Json,
    All,
}

impl FormatArg {
    pub fn formats(self) -> Vec<ReportFormat> {
        match self {
            FormatArg::Text => vec![ReportFormat::Text],
            FormatArg::Csv => vec![ReportFormat::Csv],
            FormatArg::Json => vec![ReportFormat::Json],
            FormatArg::All => ReportFormat::ALL.to_vec(),
        }
    }
}

impl Cli {
    pub fn geometry_timeout(&self) -> Option<Duration> {
        match self.geometry_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}
