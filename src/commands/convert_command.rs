use crate::app_state::AppState;
use crate::args::ConversionArgs;
use crate::errors::AppError;
use crate::file_selector::{FileSelector, TermFileSelector};
use crate::pipeline::{ConversionOutcome, ConversionPipeline};
use crate::rasterizers::{ImageMagickOptions, ImageMagickRasterizer, Rasterizer};
use crate::reporter::AppReporter;
use crate::settings::{SettingsPrompt, SettingsResponse, TermSettingsPrompt};
use crate::worker::ConversionWorker;
use crate::AppResult;
use console::{Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use rvstruct::ValueStruct;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ConvertCommandOptions {
    pub file: Option<PathBuf>,
    pub conversion_args: ConversionArgs,
    pub overwrite: bool,
    pub ask_settings: bool,
}

pub struct ConvertCommandResult {
    pub outcome: ConversionOutcome,
    pub session_saved: bool,
}

pub fn image_magick_options(state: &AppState, page: u32) -> ImageMagickOptions {
    ImageMagickOptions {
        binary: state.config.tools.magick_binary.clone(),
        legacy_commands: state.config.tools.legacy_commands,
        page,
    }
}

pub async fn command_convert(
    term: &Term,
    reporter: &AppReporter,
    state: &mut AppState,
    options: ConvertCommandOptions,
) -> AppResult<ConvertCommandResult> {
    let rasterizer = ImageMagickRasterizer::new(image_magick_options(
        state,
        options.conversion_args.page,
    ));
    let file_selector = TermFileSelector::new(term);
    let settings_prompt = TermSettingsPrompt::new(term);
    convert_with(
        term,
        reporter,
        state,
        options,
        &file_selector,
        &settings_prompt,
        rasterizer,
    )
    .await
}

async fn convert_with<R: Rasterizer + 'static>(
    term: &Term,
    reporter: &AppReporter,
    state: &mut AppState,
    options: ConvertCommandOptions,
    file_selector: &impl FileSelector,
    settings_prompt: &impl SettingsPrompt,
    rasterizer: R,
) -> AppResult<ConvertCommandResult> {
    let bold_style = Style::new().bold();

    reporter.report_pending("Waiting for a PDF file... ")?;
    let selected = match options.file {
        Some(ref file) => Ok(file.clone()),
        None => {
            // The prompt needs its own line.
            term.write_line("")?;
            file_selector.select(state.initial_dir().as_deref())
        }
    };
    let source = match selected.and_then(|file| Ok(state.load_file(&file)?.to_path_buf())) {
        Ok(source) => {
            reporter.complete_pending("OK")?;
            source
        }
        Err(err) => {
            reporter.complete_pending(if err.is_cancellation() {
                "cancelled"
            } else {
                "failed"
            })?;
            state.clear_loaded();
            return Err(err);
        }
    };
    reporter.report_timed(format!(
        "Loaded {}",
        bold_style.apply_to(source.display().to_string())
    ))?;

    match options
        .conversion_args
        .resolve(&state.settings, &state.config.max_width_bounds())
    {
        Ok(settings) => state.settings = settings,
        Err(err) => {
            state.clear_loaded();
            return Err(err);
        }
    }
    if options.ask_settings || state.config.auto_start {
        reporter.report_timed("Requesting conversion settings")?;
        let response = settings_prompt
            .request(&state.settings, &state.config.max_width_bounds())
            .inspect_err(|_| state.clear_loaded())?;
        if response == SettingsResponse::Cancelled {
            reporter.report_timed("Settings cancelled")?;
            state.clear_loaded();
            return Err(AppError::UserCancelled);
        }
        state.apply_settings(response);
    }
    reporter.report_timed(format!(
        "Max width {} px, rotation {} degrees",
        bold_style.apply_to(state.settings.max_width),
        bold_style.apply_to(state.settings.angle)
    ))?;

    let request = state.conversion_request(options.overwrite)?;
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {msg}",
    )?);
    bar.set_message(format!("Converting {}", source.display()));
    bar.enable_steady_tick(Duration::from_millis(100));

    let pipeline = ConversionPipeline::new(rasterizer, reporter.with_progress_bar(&bar));
    let worker = ConversionWorker::new(pipeline);
    reporter.report_timed("Conversion started")?;
    let result = match worker.start(request) {
        Ok(task) => task.wait().await,
        Err(err) => Err(err),
    };
    bar.finish_and_clear();
    tracing::debug!("Conversion pipeline ended {}", worker.pipeline().state());

    // The session is kept for attempted conversions too.
    let session_saved = state.save_session().await?;

    match result {
        Ok(outcome) => {
            state.clear_loaded();
            reporter.report_timed(format!(
                "Saved {} (density {})",
                Style::new()
                    .bold()
                    .green()
                    .apply_to(outcome.target.display().to_string()),
                outcome.density.value()
            ))?;
            Ok(ConvertCommandResult {
                outcome,
                session_saved,
            })
        }
        Err(err) => {
            reporter.alert()?;
            reporter.report_timed(format!(
                "{}",
                Style::new().bold().red().apply_to("Conversion failed")
            ))?;
            Err(err)
        }
    }
}
