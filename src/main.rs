use clap::Parser;
use console::{Style, Term};
use rvstruct::ValueStruct;
use tracing_subscriber::EnvFilter;

use std::error::Error;

mod args;
use crate::commands::*;
use crate::errors::AppError;
use args::*;

mod app_state;
use crate::app_state::AppState;

mod common_types;

mod commands;

mod config;
use crate::config::AppConfig;

mod density;

mod errors;

mod file_selector;

mod pipeline;

mod rasterizers;

mod reporter;
use crate::reporter::AppReporter;

mod session;

mod settings;

mod worker;

mod working_dir;

pub type AppResult<T> = Result<T, AppError>;

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "pdf2png=debug" } else { "pdf2png=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let term = Term::stdout();
    let bold_style = Style::new().bold();

    let cli = CliArgs::parse();
    init_tracing(cli.verbose);

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            term.write_line(
                format!("{}: {}", bold_style.clone().red().apply_to("Error"), err).as_str(),
            )?;
            std::process::exit(2);
        }
    };

    term.write_line(
        format!(
            "{} v{}",
            bold_style.clone().green().apply_to(&config.app.title),
            bold_style.apply_to(env!("CARGO_PKG_VERSION"))
        )
        .as_str(),
    )?;

    if let Err(err) = handle_args(cli, config, &term).await {
        if err.is_cancellation() {
            term.write_line(format!("{}", Style::new().yellow().apply_to(err)).as_str())?;
            return Ok(());
        }
        term.write_line(
            format!(
                "{}: {}\nDetails: {:?}",
                bold_style.clone().red().apply_to("Error"),
                err,
                err.source()
            )
            .as_str(),
        )?;
        std::process::exit(1);
    }

    Ok(())
}

async fn handle_args(cli: CliArgs, config: AppConfig, term: &Term) -> AppResult<()> {
    let bold_style = Style::new().bold();
    let reporter = AppReporter::new(term, &config.console, config.app.sounds);
    let mut state = AppState::load(config).await?;

    match cli.command {
        CliCommand::Convert {
            file,
            conversion_args,
            overwrite,
            ask_settings,
        } => {
            let options = ConvertCommandOptions {
                file,
                conversion_args,
                overwrite,
                ask_settings,
            };
            let convert_result = command_convert(term, &reporter, &mut state, options).await?;
            term.write_line(
                format!(
                    "{} -> {}\nPrint size {}, density {}, rotated: {}, took {:.1}s.{}",
                    convert_result.outcome.source.display(),
                    bold_style
                        .clone()
                        .green()
                        .apply_to(convert_result.outcome.target.display().to_string()),
                    convert_result.outcome.print_size,
                    bold_style.apply_to(convert_result.outcome.density.value()),
                    convert_result.outcome.rotated,
                    convert_result.outcome.elapsed.as_secs_f64(),
                    if convert_result.session_saved {
                        ""
                    } else {
                        " Session not saved."
                    }
                )
                .as_str(),
            )?;
        }
        CliCommand::Identify {
            file,
            conversion_args,
        } => {
            let identify_result = command_identify(term, &state, &file, &conversion_args).await?;
            tracing::debug!(
                "Identified {} as {} (density {} for {} px)",
                file.display(),
                identify_result.print_size,
                identify_result.density.value(),
                identify_result.max_width
            );
        }
        CliCommand::Session { clear } => {
            command_session(term, &state, clear).await?;
        }
    }

    Ok(())
}
