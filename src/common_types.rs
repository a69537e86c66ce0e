use rvstruct::ValueStruct;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Rasterization resolution handed to the rasterizer, dots per unit of the reported print size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueStruct)]
pub struct Density(u32);

/// Physical page size as reported by the rasterizer's metadata output.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PdfPrintSize {
    pub width: f64,
    pub height: f64,
}

impl PdfPrintSize {
    pub fn largest_dimension(&self) -> f64 {
        self.width.abs().max(self.height.abs())
    }
}

impl Display for PdfPrintSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, ValueStruct)]
pub struct ImagePath(PathBuf);

impl ImagePath {
    pub fn as_path(&self) -> &Path {
        self.value().as_path()
    }
}
