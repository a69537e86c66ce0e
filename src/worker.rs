use crate::errors::AppError;
use crate::pipeline::{ConversionOutcome, ConversionPipeline, ConversionRequest};
use crate::rasterizers::Rasterizer;
use crate::AppResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Runs conversions in the background, one at a time.
pub struct ConversionWorker<R: Rasterizer + 'static> {
    pipeline: Arc<ConversionPipeline<R>>,
    busy: Arc<AtomicBool>,
}

/// Handle to a conversion started by [`ConversionWorker::start`].
pub struct ConversionTask {
    handle: JoinHandle<AppResult<ConversionOutcome>>,
}

struct BusyRelease(Arc<AtomicBool>);

impl Drop for BusyRelease {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<R: Rasterizer + 'static> ConversionWorker<R> {
    pub fn new(pipeline: ConversionPipeline<R>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn pipeline(&self) -> &ConversionPipeline<R> {
        &self.pipeline
    }

    /// Starts a conversion unless one is already running.
    pub fn start(&self, request: ConversionRequest) -> AppResult<ConversionTask> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AppError::ConversionInProgress);
        }
        let release = BusyRelease(self.busy.clone());
        let pipeline = self.pipeline.clone();
        let handle = tokio::spawn(async move {
            let _release = release;
            pipeline.run(&request).await
        });
        Ok(ConversionTask { handle })
    }
}

impl ConversionTask {
    pub async fn wait(self) -> AppResult<ConversionOutcome> {
        self.handle.await?
    }
}
