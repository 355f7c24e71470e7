// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch runs over many model files
//!
//! Each file is opened, measured and validated on its own; nothing a file
//! does can affect another. Files run on a worker pool, their reports are
//! collected in input order, and the batch totals are a sequential fold over
//! those reports. Rerunning the same batch therefore gives bit-identical
//! totals.

use crate::aggregate::{AggregateRecord, Totals};
use crate::compliance::{ComplianceResult, ComplianceValidator};
use crate::error::Result;
use crate::guard::GuardedEvaluator;
use crate::quantity::{QuantityKind, QuantityResolver, ResolvedQuantity};
use crate::spec_doc::ValidationSpec;
use crate::support::filter_supported;
use ifc_qto_model::{IfcModel, IfcType, ModelLoader, VolumeEvaluator};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Batch run options
#[derive(Clone, Debug, PartialEq)]
pub struct BatchOptions {
    /// Worker threads; 0 lets rayon decide
    pub jobs: usize,
    /// Per-entity limit on geometry evaluation
    pub geometry_timeout: Option<Duration>,
    /// Derive volumes from geometry when no declared value exists
    pub geometry: bool,
    /// Extension of model files, without the dot
    pub extension: String,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            jobs: 0,
            geometry_timeout: Some(Duration::from_secs(10)),
            geometry: true,
            extension: "json".to_string(),
        }
    }
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequential run without geometry, for tests and quick checks
    pub fn fast() -> Self {
        Self {
            jobs: 1,
            geometry: false,
            ..Self::default()
        }
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_geometry_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.geometry_timeout = timeout;
        self
    }

    pub fn with_geometry(mut self, enabled: bool) -> Self {
        self.geometry = enabled;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }
}

/// Stops scheduling files that have not started yet
///
/// Files already being processed run to completion.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How far processing of one file got
#[derive(Clone, Debug, PartialEq)]
pub enum FileStatus {
    Completed,
    /// The model could not be opened
    Failed(String),
    /// The batch was cancelled before this file started
    Skipped,
}

/// Everything a batch run learned about one file
#[derive(Clone, Debug)]
pub struct FileReport {
    pub path: PathBuf,
    /// Declared schema, when the model opened
    pub schema: Option<String>,
    pub status: FileStatus,
    /// Present when the model opened
    pub compliance: Option<ComplianceResult>,
    /// Resolved quantities, ordered by type, entity and kind
    pub quantities: Vec<ResolvedQuantity>,
    /// One record per tracked type and kind
    pub aggregates: Vec<AggregateRecord>,
}

impl FileReport {
    fn empty(path: &Path, status: FileStatus) -> Self {
        Self {
            path: path.to_path_buf(),
            schema: None,
            status,
            compliance: None,
            quantities: Vec::new(),
            aggregates: Vec::new(),
        }
    }

    /// File name for display
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            FileStatus::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Outcome of a whole batch run
#[derive(Clone, Debug)]
pub struct BatchResult {
    pub spec: ValidationSpec,
    /// Per-file reports in input order
    pub files: Vec<FileReport>,
    /// Totals across every completed file
    pub totals: Vec<AggregateRecord>,
}

impl BatchResult {
    pub fn completed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Completed)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.error().is_some()).count()
    }
}

/// Runs one specification over a list of model files
pub struct BatchRunner {
    loader: Arc<dyn ModelLoader>,
    evaluator: Option<Arc<dyn VolumeEvaluator>>,
    spec: ValidationSpec,
    options: BatchOptions,
    cancel: CancelToken,
}

impl BatchRunner {
    pub fn new(loader: Arc<dyn ModelLoader>, spec: ValidationSpec) -> Self {
        Self {
            loader,
            evaluator: None,
            spec,
            options: BatchOptions::default(),
            cancel: CancelToken::new(),
        }
    }

    /// Geometry evaluator used when `options.geometry` is set
    pub fn with_evaluator(mut self, evaluator: Arc<dyn VolumeEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Token that stops the run from starting further files
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Process every file and reduce the totals
    ///
    /// Per-file failures are recorded in the result. The only error is a
    /// worker pool that cannot be built.
    pub fn run(&self, files: &[PathBuf]) -> Result<BatchResult> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.jobs)
            .thread_name(|i| format!("ifc-qto-worker-{}", i))
            .build()?;

        let resolver = self.quantity_resolver();
        let validator = ComplianceValidator::new(&self.spec);
        log::info!(
            "processing {} files with '{}' ({} workers)",
            files.len(),
            self.spec.name,
            pool.current_num_threads()
        );

        let reports: Vec<FileReport> = pool.install(|| {
            files
                .par_iter()
                .map(|path| self.process_file(path, &resolver, &validator))
                .collect()
        });

        let mut totals = Totals::new(&self.spec.tracked_types, &self.spec.quantity_kinds);
        for report in &reports {
            totals.merge(&report.aggregates);
        }

        let result = BatchResult {
            spec: self.spec.clone(),
            files: reports,
            totals: totals.into_records(),
        };
        log::info!(
            "batch finished: {} completed, {} failed, {} skipped",
            result.completed(),
            result.failed(),
            result.files.len() - result.completed() - result.failed()
        );
        Ok(result)
    }

    fn quantity_resolver(&self) -> QuantityResolver {
        match (&self.evaluator, self.options.geometry) {
            (Some(evaluator), true) => QuantityResolver::new().with_evaluator(
                GuardedEvaluator::new(Arc::clone(evaluator))
                    .with_timeout(self.options.geometry_timeout),
            ),
            _ => QuantityResolver::new(),
        }
    }

    fn process_file(
        &self,
        path: &Path,
        resolver: &QuantityResolver,
        validator: &ComplianceValidator,
    ) -> FileReport {
        if self.cancel.is_cancelled() {
            log::info!("{}: skipped", path.display());
            return FileReport::empty(path, FileStatus::Skipped);
        }

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !self.loader.accepts_extension(&extension) {
            log::error!("{}: not a model file this loader reads", path.display());
            return FileReport::empty(
                path,
                FileStatus::Failed(format!("unsupported file type '.{}'", extension)),
            );
        }

        let model = match self.loader.load(path) {
            Ok(model) => model,
            Err(e) => {
                log::error!("{}: cannot open model: {}", path.display(), e);
                return FileReport::empty(path, FileStatus::Failed(e.to_string()));
            }
        };

        let schema = model.metadata().schema();
        let mut requested = validator.requested_fields();
        requested.extend(self.spec.tracked_types.iter().cloned());
        let support = filter_supported(&schema, &requested);

        let compliance = validator.validate(model.as_ref(), &support);

        // Unsupported types get no record, so they can never read as zero
        let supported_types: Vec<&String> = self
            .spec
            .tracked_types
            .iter()
            .filter(|t| support.is_supported(t))
            .collect();
        let mut totals = Totals::new(&supported_types, &self.spec.quantity_kinds);
        let mut quantities = Vec::new();
        for type_name in supported_types {
            let resolved = resolve_type(&model, type_name, &self.spec.quantity_kinds, resolver);
            resolved.iter().for_each(|q| totals.add(q));
            quantities.extend(resolved);
        }

        log::info!(
            "{}: {} ({} quantities, {} unsupported fields)",
            path.display(),
            schema,
            quantities.len(),
            support.unsupported.len()
        );

        FileReport {
            path: path.to_path_buf(),
            schema: Some(schema.as_str().to_string()),
            status: FileStatus::Completed,
            compliance: Some(compliance),
            quantities,
            aggregates: totals.into_records(),
        }
    }
}

/// Resolve every kind for every entity of one type, in entity order
fn resolve_type(
    model: &Arc<dyn IfcModel>,
    type_name: &str,
    kinds: &[QuantityKind],
    resolver: &QuantityResolver,
) -> Vec<ResolvedQuantity> {
    let mut entities = model.resolver().entities_by_type(&IfcType::parse(type_name));
    entities.sort_by_key(|e| e.id);

    let mut resolved = Vec::with_capacity(entities.len() * kinds.len());
    for entity in &entities {
        for kind in kinds {
            let mut quantity = resolver.resolve(model, entity, *kind);
            // Report under the tracked name so totals line up
            quantity.type_tag = type_name.to_string();
            resolved.push(quantity);
        }
    }
    resolved
}
