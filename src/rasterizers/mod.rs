use crate::common_types::{Density, ImagePath, PdfPrintSize};
use crate::AppResult;
use std::future::Future;
use std::path::Path;

mod image_magick;
pub use image_magick::*;

/// External toolkit that inspects and rasterizes PDF pages.
pub trait Rasterizer: Send + Sync {
    /// Reads the print size of the page.
    fn identify(&self, source: &Path) -> impl Future<Output = AppResult<PdfPrintSize>> + Send;

    /// Renders the page at `density` into a PNG at `output`.
    fn rasterize(
        &self,
        source: &Path,
        density: Density,
        output: &Path,
    ) -> impl Future<Output = AppResult<ImagePath>> + Send;

    /// Rotates the image by `angle` degrees, replacing it.
    fn rotate(&self, image: &Path, angle: f64) -> impl Future<Output = AppResult<ImagePath>> + Send;
}

#[cfg(test)]
pub mod fake;
