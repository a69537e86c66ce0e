use crate::common_types::{Density, ImagePath, PdfPrintSize};
use crate::density::parse_print_size;
use crate::errors::AppError;
use crate::rasterizers::Rasterizer;
use crate::AppResult;
use rvstruct::ValueStruct;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct ImageMagickOptions {
    pub binary: PathBuf,
    pub legacy_commands: bool,
    /// Zero based page of the document to render.
    pub page: u32,
}

impl Default for ImageMagickOptions {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("magick"),
            legacy_commands: false,
            page: 0,
        }
    }
}

/// Rasterizer backed by the ImageMagick command line tools (Ghostscript does the PDF part).
#[derive(Debug, Clone)]
pub struct ImageMagickRasterizer {
    options: ImageMagickOptions,
}

impl ImageMagickRasterizer {
    const LEGACY_IDENTIFY: &'static str = "identify";
    const LEGACY_CONVERT: &'static str = "convert";

    pub fn new(options: ImageMagickOptions) -> Self {
        Self { options }
    }

    fn identify_command(&self) -> Command {
        if self.options.legacy_commands {
            Command::new(Self::LEGACY_IDENTIFY)
        } else {
            let mut command = Command::new(&self.options.binary);
            command.arg("identify");
            command
        }
    }

    fn convert_command(&self) -> Command {
        if self.options.legacy_commands {
            Command::new(Self::LEGACY_CONVERT)
        } else {
            Command::new(&self.options.binary)
        }
    }

    fn page_selector(&self, source: &Path) -> OsString {
        let mut selector = source.as_os_str().to_os_string();
        selector.push(format!("[{}]", self.options.page));
        selector
    }

    async fn run(&self, mut command: Command) -> AppResult<String> {
        let tool = command.as_std().get_program().to_string_lossy().to_string();
        tracing::debug!(
            "Running {} {}",
            tool,
            command
                .as_std()
                .get_args()
                .map(OsStr::to_string_lossy)
                .collect::<Vec<_>>()
                .join(" ")
        );
        let output = command
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| AppError::ExternalToolFailure {
                tool: tool.clone(),
                message: if err.kind() == std::io::ErrorKind::NotFound {
                    format!("{tool} was not found. Is ImageMagick installed and on PATH?")
                } else {
                    err.to_string()
                },
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::ExternalToolFailure {
                tool,
                message: format!("{}\n{}", output.status, stderr.trim()),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl Rasterizer for ImageMagickRasterizer {
    async fn identify(&self, source: &Path) -> AppResult<PdfPrintSize> {
        let mut command = self.identify_command();
        command.arg("-verbose").arg(self.page_selector(source));
        let metadata = self.run(command).await?;
        parse_print_size(&metadata).map_err(|err| AppError::ExternalToolFailure {
            tool: "identify".to_string(),
            message: err.to_string(),
        })
    }

    async fn rasterize(
        &self,
        source: &Path,
        density: Density,
        output: &Path,
    ) -> AppResult<ImagePath> {
        let mut command = self.convert_command();
        command
            .arg("-density")
            .arg(density.value().to_string())
            .arg(self.page_selector(source))
            .arg(output);
        self.run(command).await?;
        ensure_written(output).await?;
        Ok(ImagePath::from(output.to_path_buf()))
    }

    async fn rotate(&self, image: &Path, angle: f64) -> AppResult<ImagePath> {
        let folder = image.parent().unwrap_or_else(|| Path::new("."));
        let rotated = tempfile::Builder::new()
            .prefix("__rotate__")
            .suffix(".png")
            .tempfile_in(folder)?
            .into_temp_path();

        let mut command = self.convert_command();
        command
            .arg(image)
            .arg("-background")
            .arg("none")
            .arg("-rotate")
            .arg(angle.to_string())
            .arg(&*rotated);
        self.run(command).await?;
        ensure_written(&rotated).await?;

        rotated.persist(image).map_err(|err| err.error)?;
        Ok(ImagePath::from(image.to_path_buf()))
    }
}

// Output paths may be pre-created empty placeholders, so existence alone proves nothing.
async fn ensure_written(output: &Path) -> AppResult<()> {
    let written = tokio::fs::metadata(output)
        .await
        .map(|metadata| metadata.is_file() && metadata.len() > 0)
        .unwrap_or(false);
    if written {
        Ok(())
    } else {
        Err(AppError::ExternalToolFailure {
            tool: "convert".to_string(),
            message: format!("No image was written to {}", output.display()),
        })
    }
}
