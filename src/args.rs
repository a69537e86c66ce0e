use crate::settings::{validate_settings, ConversionSettings, MaxWidthBounds};
use crate::AppResult;
use clap::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, about)]
pub struct CliArgs {
    #[arg(
        long,
        global = true,
        help = "JSON config file (defaults to <config dir>/pdf2png/config.json)"
    )]
    pub config: Option<PathBuf>,

    #[arg(short = 'v', long, global = true, help = "Print debug logs to stderr")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    #[command(about = "Convert a PDF page into a transparent PNG next to it")]
    Convert {
        #[arg(help = "PDF file to convert. Asked for interactively when omitted")]
        file: Option<PathBuf>,

        #[command(flatten)]
        conversion_args: ConversionArgs,

        #[arg(long, help = "Replace an existing PNG with the same name")]
        overwrite: bool,

        #[arg(
            short = 's',
            long,
            help = "Ask for conversion settings before converting"
        )]
        ask_settings: bool,
    },
    #[command(about = "Show the print size of a PDF page and the density used to convert it")]
    Identify {
        #[arg(help = "PDF file to inspect")]
        file: PathBuf,

        #[command(flatten)]
        conversion_args: ConversionArgs,
    },
    #[command(about = "Show or clear the remembered folder and file")]
    Session {
        #[arg(long, help = "Forget the last folder and file")]
        clear: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConversionArgs {
    #[arg(
        short = 'w',
        long,
        help = "Target size in pixels of the largest page dimension"
    )]
    pub max_width: Option<String>,

    #[arg(
        short = 'a',
        long,
        allow_hyphen_values = true,
        help = "Rotation angle in degrees, 0 disables rotation"
    )]
    pub angle: Option<String>,

    #[arg(short = 'p', long, default_value = "0", help = "Zero based page to convert")]
    pub page: u32,
}

impl ConversionArgs {
    /// Applies the command line overrides on top of `current`.
    pub fn resolve(
        &self,
        current: &ConversionSettings,
        bounds: &MaxWidthBounds,
    ) -> AppResult<ConversionSettings> {
        if self.max_width.is_none() && self.angle.is_none() {
            return Ok(*current);
        }
        let max_width = self
            .max_width
            .clone()
            .unwrap_or_else(|| current.max_width.to_string());
        let angle = self
            .angle
            .clone()
            .unwrap_or_else(|| current.angle.to_string());
        validate_settings(&max_width, &angle, bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    const BOUNDS: MaxWidthBounds = MaxWidthBounds {
        min: 1920,
        max: 12500,
    };
    const CURRENT: ConversionSettings = ConversionSettings {
        max_width: 9600,
        angle: -90.0,
    };

    #[test]
    fn parses_convert_command() {
        let cli = CliArgs::parse_from([
            "pdf2png", "convert", "plan.pdf", "-w", "5000", "--angle", "-90", "--overwrite",
        ]);
        match cli.command {
            CliCommand::Convert {
                file,
                conversion_args,
                overwrite,
                ask_settings,
            } => {
                assert_eq!(file, Some(PathBuf::from("plan.pdf")));
                assert_eq!(conversion_args.max_width.as_deref(), Some("5000"));
                assert_eq!(conversion_args.angle.as_deref(), Some("-90"));
                assert_eq!(conversion_args.page, 0);
                assert!(overwrite);
                assert!(!ask_settings);
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn overrides_keep_missing_values() {
        let args = ConversionArgs {
            max_width: None,
            angle: Some("0".to_string()),
            page: 0,
        };
        assert_eq!(
            args.resolve(&CURRENT, &BOUNDS).unwrap(),
            ConversionSettings {
                max_width: 9600,
                angle: 0.0
            }
        );
        assert_eq!(
            ConversionArgs::default().resolve(&CURRENT, &BOUNDS).unwrap(),
            CURRENT
        );
    }

    #[test]
    fn overrides_are_validated() {
        let args = ConversionArgs {
            max_width: Some("20000".to_string()),
            angle: None,
            page: 0,
        };
        assert!(matches!(
            args.resolve(&CURRENT, &BOUNDS),
            Err(AppError::InvalidInput { .. })
        ));
    }
}
