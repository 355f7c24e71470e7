// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounded, panic-safe calls into a geometry evaluator

use ifc_qto_model::{DecodedEntity, IfcModel, ModelError, VolumeEvaluator};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc, OnceLock};
use std::time::Duration;
use thiserror::Error;

/// Worker threads shared by all bounded evaluations of one guard
pub const EVALUATION_WORKERS: usize = 4;

/// Why a guarded evaluation produced no value
#[derive(Error, Debug)]
pub enum EvaluationFailure {
    #[error("evaluator failed: {0}")]
    Failed(#[from] ModelError),

    #[error("evaluator panicked")]
    Panicked,

    #[error("evaluator exceeded {0:?}")]
    TimedOut(Duration),

    #[error("cannot start evaluator pool: {0}")]
    Spawn(String),
}

/// Wraps a [`VolumeEvaluator`] so that one entity can never stall or crash a
/// batch.
///
/// Without a timeout the call runs inline under `catch_unwind`. With one, it
/// runs on a pool of [`EVALUATION_WORKERS`] threads, started on first use and
/// shared by clones; after the deadline the caller stops waiting and the
/// worker's eventual result is dropped. A worker stuck in a hung evaluation
/// stays busy until it returns, so once every worker is stuck later calls
/// time out as well.
#[derive(Clone)]
pub struct GuardedEvaluator {
    evaluator: Arc<dyn VolumeEvaluator>,
    timeout: Option<Duration>,
    pool: Arc<OnceLock<Result<ThreadPool, String>>>,
}

impl GuardedEvaluator {
    pub fn new(evaluator: Arc<dyn VolumeEvaluator>) -> Self {
        Self {
            evaluator,
            timeout: None,
            pool: Arc::new(OnceLock::new()),
        }
    }

    /// Abandon evaluations that run longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Volume of `entity` in cubic metres
    pub fn volume(
        &self,
        entity: &Arc<DecodedEntity>,
        model: &Arc<dyn IfcModel>,
    ) -> Result<Option<f64>, EvaluationFailure> {
        match self.timeout {
            None => self.volume_inline(entity, model),
            Some(timeout) => self.volume_bounded(entity, model, timeout),
        }
    }

    fn volume_inline(
        &self,
        entity: &DecodedEntity,
        model: &Arc<dyn IfcModel>,
    ) -> Result<Option<f64>, EvaluationFailure> {
        panic::catch_unwind(AssertUnwindSafe(|| {
            self.evaluator.volume(entity, model.as_ref())
        }))
        .map_err(|_| EvaluationFailure::Panicked)?
        .map_err(EvaluationFailure::from)
    }

    fn volume_bounded(
        &self,
        entity: &Arc<DecodedEntity>,
        model: &Arc<dyn IfcModel>,
        timeout: Duration,
    ) -> Result<Option<f64>, EvaluationFailure> {
        let pool = self.pool()?;
        let (tx, rx) = mpsc::channel();
        let evaluator = Arc::clone(&self.evaluator);
        let entity = Arc::clone(entity);
        let model = Arc::clone(model);

        pool.spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                evaluator.volume(&entity, model.as_ref())
            }));
            // Receiver is gone once the deadline passed
            let _ = tx.send(result);
        });

        match rx.recv_timeout(timeout) {
            Ok(Ok(result)) => result.map_err(EvaluationFailure::from),
            Ok(Err(_)) => Err(EvaluationFailure::Panicked),
            Err(mpsc::RecvTimeoutError::Timeout) => Err(EvaluationFailure::TimedOut(timeout)),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EvaluationFailure::Panicked),
        }
    }

    fn pool(&self) -> Result<&ThreadPool, EvaluationFailure> {
        self.pool
            .get_or_init(|| {
                log::debug!("starting {} evaluator workers", EVALUATION_WORKERS);
                ThreadPoolBuilder::new()
                    .num_threads(EVALUATION_WORKERS)
                    .thread_name(|i| format!("ifc-qto-eval-{}", i))
                    .build()
                    .map_err(|e| e.to_string())
            })
            .as_ref()
            .map_err(|e| EvaluationFailure::Spawn(e.clone()))
    }
}

impl std::fmt::Debug for GuardedEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedEvaluator")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
