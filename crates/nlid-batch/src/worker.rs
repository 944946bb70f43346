// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::config::NlidConfig;
use crate::orchestrator::run_batch;
use crate::result::BatchResult;
use crate::source::{ColumnPair, ColumnSource};
use nlid_core::{CancelToken, ExecutionContext, NlidError, ProgressSink};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

const WORKER_THREAD_NAME: &str = "nlid-batch-worker";

/// Builder for a batch run on a dedicated background thread.
pub struct BatchWorker<S> {
    sources: Vec<S>,
    pairs: Vec<ColumnPair>,
    config: NlidConfig,
    cancel: CancelToken,
    progress: Option<Arc<dyn ProgressSink + Send + Sync>>,
}

impl<S> BatchWorker<S>
where
    S: ColumnSource + Send + 'static,
{
    pub fn new(sources: Vec<S>, pairs: Vec<ColumnPair>, config: NlidConfig) -> Self {
        Self {
            sources,
            pairs,
            config,
            cancel: CancelToken::new(),
            progress: None,
        }
    }

    /// Shares an existing token instead of the worker's own.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Receives `(completed, total)` from the worker thread, once per source.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink + Send + Sync>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Validates the configuration on the calling thread, then starts the run.
    pub fn spawn(self) -> Result<BatchHandle, NlidError> {
        self.config.validate()?;
        if self.pairs.is_empty() {
            return Err(NlidError::configuration(
                "at least one column pair is required",
            ));
        }

        let Self {
            sources,
            pairs,
            config,
            cancel,
            progress,
        } = self;
        let worker_cancel = cancel.clone();

        let join = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let mut ctx = ExecutionContext::new().with_cancel(&worker_cancel);
                if let Some(progress) = progress.as_deref() {
                    ctx = ctx.with_progress_sink(progress);
                }
                run_batch(&sources, &pairs, &config, &ctx)
            })
            .map_err(|err| NlidError::io(format!("failed to spawn batch worker: {err}")))?;

        Ok(BatchHandle { join, cancel })
    }
}

/// Starts `run_batch` on a background thread with default options.
pub fn spawn_batch<S>(
    sources: Vec<S>,
    pairs: Vec<ColumnPair>,
    config: NlidConfig,
) -> Result<BatchHandle, NlidError>
where
    S: ColumnSource + Send + 'static,
{
    BatchWorker::new(sources, pairs, config).spawn()
}

/// Handle to a running batch.
#[derive(Debug)]
pub struct BatchHandle {
    join: JoinHandle<Result<BatchResult, NlidError>>,
    cancel: CancelToken,
}

impl BatchHandle {
    /// Requests cancellation; the worker stops before its next source.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Blocks until the worker ends. A worker panic maps to [`NlidError::Internal`].
    pub fn join(self) -> Result<BatchResult, NlidError> {
        self.join
            .join()
            .map_err(|_| NlidError::internal("batch worker panicked"))?
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchWorker, spawn_batch};
    use crate::config::NlidConfig;
    use crate::source::{ColumnPair, ColumnSource, InMemorySource};
    use nlid_core::{CancelToken, NlidError, ProgressSink};
    use std::borrow::Cow;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    fn source(name: &str, len: usize) -> InMemorySource {
        let x: Vec<f64> = (0..len).map(|i| (i as f64 * 0.2).sin()).collect();
        let y: Vec<f64> = (0..len).map(|i| (i as f64 * 0.3).cos()).collect();
        InMemorySource::new(name).with_column("X", x).with_column("Y", y)
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(usize, usize)>>);

    impl ProgressSink for Recorder {
        fn on_progress(&self, completed: usize, total: usize) {
            self.0.lock().expect("progress lock").push((completed, total));
        }
    }

    #[test]
    fn worker_runs_batch_off_thread() {
        let recorder = Arc::new(Recorder::default());
        let handle = BatchWorker::new(
            vec![source("a", 300), source("b", 300), source("c", 300)],
            vec![ColumnPair::new("X", "Y")],
            NlidConfig::default(),
        )
        .with_progress(recorder.clone())
        .spawn()
        .expect("worker should start");

        while !handle.is_finished() {
            thread::sleep(Duration::from_millis(1));
        }
        let batch = handle.join().expect("batch should finish");
        assert_eq!(batch.results.len(), 3);

        let progress = recorder.0.lock().expect("progress lock");
        assert_eq!(progress.last(), Some(&(3, 3)));
        assert!(progress.windows(2).all(|pair| pair[0].0 <= pair[1].0));
    }

    #[test]
    fn invalid_configuration_is_rejected_before_spawning() {
        let config = NlidConfig {
            overlap: 1.0,
            ..NlidConfig::default()
        };
        let err = spawn_batch(vec![source("a", 300)], vec![ColumnPair::new("X", "Y")], config)
            .expect_err("overlap 1.0 must fail");
        assert!(matches!(err, NlidError::Configuration(_)));
    }

    struct SlowSource(InMemorySource);

    impl ColumnSource for SlowSource {
        fn name(&self) -> &str {
            self.0.name()
        }

        fn column(&self, column: &str) -> Result<Cow<'_, [f64]>, NlidError> {
            thread::sleep(Duration::from_millis(5));
            self.0.column(column)
        }
    }

    #[test]
    fn cancelling_the_handle_stops_the_worker() {
        let sources: Vec<SlowSource> = (0..400)
            .map(|i| SlowSource(source(&format!("s{i}"), 150)))
            .collect();
        let cancel = CancelToken::new();
        let handle = BatchWorker::new(sources, vec![ColumnPair::new("X", "Y")], NlidConfig::default())
            .with_cancel(cancel.clone())
            .spawn()
            .expect("worker should start");

        thread::sleep(Duration::from_millis(20));
        assert!(!handle.is_finished());
        handle.cancel();
        assert!(cancel.is_cancelled());
        assert!(handle.cancel_token().is_cancelled());

        let err = handle.join().expect_err("cancelled batch must not complete");
        assert_eq!(err, NlidError::Cancelled);
    }
}
