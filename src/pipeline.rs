use crate::common_types::{Density, PdfPrintSize};
use crate::density::resolve_density;
use crate::errors::AppError;
use crate::rasterizers::Rasterizer;
use crate::reporter::AppReporter;
use crate::settings::ConversionSettings;
use crate::working_dir::WorkingDirGuard;
use crate::AppResult;
use rvstruct::ValueStruct;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const OUTPUT_EXTENSION: &str = "png";
const INTERMEDIATE_PREFIX: &str = "__convert__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Identifying,
    Rasterizing,
    Rotating,
    Finalizing,
    Error,
}

impl Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "idle"),
            PipelineState::Identifying => write!(f, "identifying"),
            PipelineState::Rasterizing => write!(f, "rasterizing"),
            PipelineState::Rotating => write!(f, "rotating"),
            PipelineState::Finalizing => write!(f, "finalizing"),
            PipelineState::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub source: PathBuf,
    pub settings: ConversionSettings,
    /// Replace an existing output image instead of refusing to start.
    pub overwrite: bool,
}

#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub source: PathBuf,
    pub target: PathBuf,
    pub print_size: PdfPrintSize,
    pub density: Density,
    pub rotated: bool,
    pub elapsed: Duration,
}

/// Output image path for a source document: same folder, extension swapped to `png`.
pub fn target_path(source: &Path) -> PathBuf {
    source.with_extension(OUTPUT_EXTENSION)
}

/// Converts one PDF page to a PNG next to it: identify, rasterize, rotate, rename.
pub struct ConversionPipeline<R: Rasterizer> {
    rasterizer: R,
    reporter: AppReporter,
    state: Mutex<PipelineState>,
}

impl<R: Rasterizer> ConversionPipeline<R> {
    pub fn new(rasterizer: R, reporter: AppReporter) -> Self {
        Self {
            rasterizer,
            reporter,
            state: Mutex::new(PipelineState::Idle),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
            .lock()
            .map(|state| *state)
            .unwrap_or(PipelineState::Error)
    }

    #[cfg(test)]
    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub async fn run(&self, request: &ConversionRequest) -> AppResult<ConversionOutcome> {
        let started = Instant::now();
        match self.convert(request, started).await {
            Ok(outcome) => {
                self.transition(PipelineState::Idle)?;
                Ok(outcome)
            }
            Err(err) => {
                self.set_state(PipelineState::Error);
                tracing::info!("Conversion of {} failed: {}", request.source.display(), err);
                Err(err)
            }
        }
    }

    async fn convert(
        &self,
        request: &ConversionRequest,
        started: Instant,
    ) -> AppResult<ConversionOutcome> {
        let source = tokio::fs::canonicalize(&request.source)
            .await
            .map_err(|err| {
                AppError::invalid_input(format!(
                    "Cannot open {}: {}",
                    request.source.display(),
                    err
                ))
            })?;
        if !source.is_file() {
            return Err(AppError::invalid_input(format!(
                "{} is not a file",
                source.display()
            )));
        }
        let folder = source
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| AppError::SystemError {
                message: format!("No parent folder for {}", source.display()),
            })?;
        let target = target_path(&source);
        if target.exists() && !request.overwrite {
            return Err(AppError::PreconditionFailed {
                message: format!("Output file {} already exists", target.display()),
            });
        }

        let _working_dir = WorkingDirGuard::enter(&folder).await?;

        self.transition(PipelineState::Identifying)?;
        let print_size = self.rasterizer.identify(&source).await?;
        let density = resolve_density(&print_size, request.settings.max_width)?;
        self.reporter.report_timed(format!(
            "Print size {}, rendering at density {} for {} px",
            print_size,
            density.value(),
            request.settings.max_width
        ))?;

        self.transition(PipelineState::Rasterizing)?;
        // Removed on drop unless persisted, so failed runs leave nothing behind.
        let intermediate = tempfile::Builder::new()
            .prefix(INTERMEDIATE_PREFIX)
            .suffix(&format!(".{OUTPUT_EXTENSION}"))
            .tempfile_in(&folder)?
            .into_temp_path();
        let mut image = self
            .rasterizer
            .rasterize(&source, density, &intermediate)
            .await?;

        let rotated = request.settings.angle != 0.0;
        if rotated {
            self.transition(PipelineState::Rotating)?;
            self.reporter.report_timed(format!(
                "Rotating by {} degrees",
                request.settings.angle
            ))?;
            image = self
                .rasterizer
                .rotate(image.as_path(), request.settings.angle)
                .await?;
        }

        self.transition(PipelineState::Finalizing)?;
        if target.exists() {
            tokio::fs::remove_file(&target).await?;
        }
        if image.as_path() == &*intermediate {
            intermediate.persist(&target).map_err(|err| err.error)?;
        } else {
            tokio::fs::rename(image.as_path(), &target).await?;
        }

        let elapsed = started.elapsed();
        self.reporter.report_timed(format!(
            "Conversion finished in {:.1}s: {}",
            elapsed.as_secs_f64(),
            target.display()
        ))?;
        Ok(ConversionOutcome {
            source,
            target,
            print_size,
            density,
            rotated,
            elapsed,
        })
    }

    fn transition(&self, state: PipelineState) -> AppResult<()> {
        self.set_state(state);
        tracing::info!("Conversion pipeline is {}", state);
        match state {
            PipelineState::Identifying => self.reporter.report_timed("Reading page print size"),
            PipelineState::Rasterizing => self.reporter.report_timed("Rasterizing page"),
            PipelineState::Finalizing => self.reporter.report_timed("Writing output image"),
            _ => Ok(()),
        }
    }

    fn set_state(&self, state: PipelineState) {
        if let Ok(mut current) = self.state.lock() {
            *current = state;
        }
    }
}
