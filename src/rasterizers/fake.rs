use crate::common_types::{Density, ImagePath, PdfPrintSize};
use crate::errors::AppError;
use crate::rasterizers::Rasterizer;
use crate::AppResult;
use rvstruct::ValueStruct;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// In-memory rasterizer recording every call, for pipeline tests.
#[derive(Debug, Default)]
pub struct FakeRasterizer {
    pub print_size: Option<PdfPrintSize>,
    pub fail_rasterize: bool,
    pub fail_rotate: bool,
    /// When set, rasterizing waits for a notification.
    pub gate: Option<Arc<Notify>>,
    pub calls: Mutex<Vec<String>>,
    pub working_dirs: Mutex<Vec<PathBuf>>,
}

impl FakeRasterizer {
    pub fn letter() -> Self {
        Self {
            print_size: Some(PdfPrintSize {
                width: 612.0,
                height: 792.0,
            }),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
        if let Ok(dir) = std::env::current_dir() {
            self.working_dirs.lock().unwrap().push(dir);
        }
    }
}

impl Rasterizer for FakeRasterizer {
    async fn identify(&self, source: &Path) -> AppResult<PdfPrintSize> {
        self.record(format!("identify {}", source.display()));
        self.print_size.ok_or_else(|| AppError::ExternalToolFailure {
            tool: "fake".to_string(),
            message: "no print size".to_string(),
        })
    }

    async fn rasterize(
        &self,
        source: &Path,
        density: Density,
        output: &Path,
    ) -> AppResult<ImagePath> {
        self.record(format!("rasterize {} {}", source.display(), density.value()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail_rasterize {
            return Err(AppError::ExternalToolFailure {
                tool: "fake".to_string(),
                message: "rasterize failed".to_string(),
            });
        }
        tokio::fs::write(output, format!("density={}", density.value())).await?;
        Ok(ImagePath::from(output.to_path_buf()))
    }

    async fn rotate(&self, image: &Path, angle: f64) -> AppResult<ImagePath> {
        self.record(format!("rotate {angle}"));
        if self.fail_rotate {
            let folder = image.parent().unwrap_or_else(|| Path::new("."));
            let _rotated = tempfile::Builder::new()
                .prefix("__rotate__")
                .suffix(".png")
                .tempfile_in(folder)?
                .into_temp_path();
            return Err(AppError::ExternalToolFailure {
                tool: "fake".to_string(),
                message: "rotate failed".to_string(),
            });
        }
        let content = tokio::fs::read_to_string(image).await?;
        tokio::fs::write(image, format!("{content};angle={angle}")).await?;
        Ok(ImagePath::from(image.to_path_buf()))
    }
}
