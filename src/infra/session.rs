// ============================================================
// Layer 6 — Compute Session
// ============================================================
// Owns the worker pool used for parallel k-mer encoding.
//
// The pool is deliberately NOT the implicit global one:
// a ComputeSession is started from explicit configuration,
// scopes the work that runs inside it, and shuts the pool
// down when dropped. That keeps the worker count a visible
// part of the run configuration instead of ambient state
// someone initialised somewhere.
//
// rayon guarantees that par_iter calls made inside
// pool.install(..) execute on that pool, which is how the
// fold loader's parallel encode ends up on exactly the
// configured number of threads.
//
// Reference: rayon crate documentation (ThreadPool::install)

use anyhow::{Context, Result};

use crate::domain::error::PipelineError;

/// An explicitly started worker pool with start/stop lifecycle.
#[derive(Debug)]
pub struct ComputeSession {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl ComputeSession {
    /// Start a session with `workers` threads.
    pub fn start(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(
                PipelineError::config("worker count must be at least 1".to_string()).into(),
            );
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .context("cannot start compute session")?;

        tracing::info!("Compute session started with {} workers", workers);
        Ok(Self { pool, workers })
    }

    /// Run `f` inside this session's pool. Any rayon
    /// parallelism inside `f` is scoped to these workers.
    pub fn run<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        self.pool.install(f)
    }
}

impl Drop for ComputeSession {
    fn drop(&mut self) {
        tracing::debug!("Compute session with {} workers stopped", self.workers);
    }
}
