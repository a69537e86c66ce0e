use crate::errors::AppError;
use crate::AppResult;
use console::{Style, Term};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionSettings {
    /// Target size in pixels of the largest page dimension.
    pub max_width: u32,
    /// Rotation in degrees, zero skips the rotation step.
    pub angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxWidthBounds {
    pub min: u32,
    pub max: u32,
}

impl MaxWidthBounds {
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

pub fn validate_settings(
    raw_max_width: &str,
    raw_angle: &str,
    bounds: &MaxWidthBounds,
) -> AppResult<ConversionSettings> {
    let raw_max_width = raw_max_width.trim();
    let raw_angle = raw_angle.trim();
    let max_width = raw_max_width.parse::<u32>().map_err(|_| {
        AppError::invalid_input(format!(
            "Max width '{}' is not a whole number of pixels",
            raw_max_width
        ))
    })?;
    let angle = raw_angle
        .parse::<f64>()
        .ok()
        .filter(|angle| angle.is_finite())
        .ok_or_else(|| AppError::invalid_input(format!("Angle '{}' is not a number", raw_angle)))?;
    if !bounds.contains(max_width) {
        return Err(AppError::invalid_input(format!(
            "Max width must be between {} and {} pixels, got {}",
            bounds.min, bounds.max, max_width
        )));
    }
    Ok(ConversionSettings { max_width, angle })
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsResponse {
    Accepted(ConversionSettings),
    Cancelled,
}

/// Asks the user for new conversion settings and returns once they are accepted or dismissed.
pub trait SettingsPrompt {
    fn request(
        &self,
        current: &ConversionSettings,
        bounds: &MaxWidthBounds,
    ) -> AppResult<SettingsResponse>;
}

/// Settings form read from the terminal.
///
/// An empty answer keeps the shown value and `q` cancels the form. A rejected pair of
/// values shows the reason and asks again.
pub struct TermSettingsPrompt<'a> {
    term: &'a Term,
}

impl<'a> TermSettingsPrompt<'a> {
    const CANCEL_ANSWER: &'static str = "q";

    pub fn new(term: &'a Term) -> Self {
        Self { term }
    }

    fn ask(&self, label: &str, current: String) -> AppResult<Option<String>> {
        self.term.write_str(
            format!(
                "{} [{}]: ",
                Style::new().bold().apply_to(label),
                Style::new().dim().apply_to(&current)
            )
            .as_str(),
        )?;
        let answer = self.term.read_line()?;
        let answer = answer.trim();
        if answer.eq_ignore_ascii_case(Self::CANCEL_ANSWER) {
            Ok(None)
        } else if answer.is_empty() {
            Ok(Some(current))
        } else {
            Ok(Some(answer.to_string()))
        }
    }
}

impl<'a> SettingsPrompt for TermSettingsPrompt<'a> {
    fn request(
        &self,
        current: &ConversionSettings,
        bounds: &MaxWidthBounds,
    ) -> AppResult<SettingsResponse> {
        self.term.write_line(
            format!(
                "Conversion settings ({} to cancel)",
                Style::new().yellow().apply_to(Self::CANCEL_ANSWER)
            )
            .as_str(),
        )?;
        loop {
            let Some(max_width) = self.ask(
                &format!("Max width ({}-{} px)", bounds.min, bounds.max),
                current.max_width.to_string(),
            )?
            else {
                return Ok(SettingsResponse::Cancelled);
            };
            let Some(angle) = self.ask("Rotation angle (deg)", current.angle.to_string())? else {
                return Ok(SettingsResponse::Cancelled);
            };
            match validate_settings(&max_width, &angle, bounds) {
                Ok(settings) => return Ok(SettingsResponse::Accepted(settings)),
                Err(err) => {
                    self.term.write_line(
                        format!("{}", Style::new().red().apply_to(err.to_string())).as_str(),
                    )?;
                }
            }
        }
    }
}
