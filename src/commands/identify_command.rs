use crate::app_state::AppState;
use crate::args::ConversionArgs;
use crate::common_types::{Density, PdfPrintSize};
use crate::commands::image_magick_options;
use crate::density::resolve_density;
use crate::file_selector::validate_pdf_path;
use crate::rasterizers::{ImageMagickRasterizer, Rasterizer};
use crate::AppResult;
use console::{Style, Term};
use rvstruct::ValueStruct;
use std::path::Path;

pub struct IdentifyCommandResult {
    pub print_size: PdfPrintSize,
    pub max_width: u32,
    pub density: Density,
}

pub async fn command_identify(
    term: &Term,
    state: &AppState,
    file: &Path,
    conversion_args: &ConversionArgs,
) -> AppResult<IdentifyCommandResult> {
    let rasterizer =
        ImageMagickRasterizer::new(image_magick_options(state, conversion_args.page));
    identify_with(term, state, file, conversion_args, &rasterizer).await
}

async fn identify_with(
    term: &Term,
    state: &AppState,
    file: &Path,
    conversion_args: &ConversionArgs,
    rasterizer: &impl Rasterizer,
) -> AppResult<IdentifyCommandResult> {
    let bold_style = Style::new().bold();
    let source = validate_pdf_path(file)?;
    let settings = conversion_args.resolve(&state.settings, &state.config.max_width_bounds())?;
    let print_size = rasterizer.identify(&source).await?;
    let density = resolve_density(&print_size, settings.max_width)?;
    term.write_line(
        format!(
            "{}\n  Print size: {}\n  Density for {} px: {}",
            bold_style.apply_to(source.display().to_string()),
            bold_style.apply_to(print_size),
            settings.max_width,
            bold_style.clone().green().apply_to(density.value())
        )
        .as_str(),
    )?;
    Ok(IdentifyCommandResult {
        print_size,
        max_width: settings.max_width,
        density,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::rasterizers::fake::FakeRasterizer;

    #[tokio::test]
    async fn identify_reports_density() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let temp_dir = tempfile::TempDir::with_prefix("identify_command_tests")?;
        let source = temp_dir.path().join("plan.pdf");
        std::fs::write(&source, "%PDF-1.4")?;
        let state = AppState::load(AppConfig {
            root: temp_dir.path().to_path_buf(),
            ..AppConfig::default()
        })
        .await?;
        let term = Term::stdout();
        let rasterizer = FakeRasterizer::letter();

        let result = identify_with(
            &term,
            &state,
            &source,
            &ConversionArgs::default(),
            &rasterizer,
        )
        .await?;
        assert_eq!(result.max_width, 9600);
        assert_eq!(*result.density.value(), 13);
        assert_eq!(rasterizer.calls().len(), 1);
        Ok(())
    }
}
