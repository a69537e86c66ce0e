use crate::errors::AppError;
use crate::AppResult;
use console::{Style, Term};
use std::path::{Path, PathBuf};

pub const PDF_EXTENSION: &str = "pdf";

/// Accepts existing `.pdf` files only.
pub fn validate_pdf_path(path: &Path) -> AppResult<PathBuf> {
    let is_pdf = path
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(PDF_EXTENSION))
        .unwrap_or(false);
    if !is_pdf {
        return Err(AppError::invalid_input(format!(
            "{} is not a PDF file",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(AppError::invalid_input(format!(
            "{} does not exist",
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}

/// Turns a typed answer into a path, relative answers starting from `initial_dir`.
pub fn resolve_selection(answer: &str, initial_dir: Option<&Path>) -> AppResult<PathBuf> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(AppError::UserCancelled);
    }
    let path = PathBuf::from(answer);
    let resolved = match initial_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path,
    };
    validate_pdf_path(&resolved)
}

pub trait FileSelector {
    fn select(&self, initial_dir: Option<&Path>) -> AppResult<PathBuf>;
}

/// File-open prompt on the terminal, an empty answer cancels.
pub struct TermFileSelector<'a> {
    term: &'a Term,
}

impl<'a> TermFileSelector<'a> {
    pub fn new(term: &'a Term) -> Self {
        Self { term }
    }
}

impl<'a> FileSelector for TermFileSelector<'a> {
    fn select(&self, initial_dir: Option<&Path>) -> AppResult<PathBuf> {
        if let Some(dir) = initial_dir {
            self.term.write_line(
                format!(
                    "Folder: {}",
                    Style::new().dim().apply_to(dir.display().to_string())
                )
                .as_str(),
            )?;
        }
        self.term.write_str(
            format!("{}: ", Style::new().bold().apply_to("PDF file to convert")).as_str(),
        )?;
        let answer = self.term.read_line()?;
        resolve_selection(&answer, initial_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_to_initial_dir() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let temp_dir = tempfile::TempDir::with_prefix("file_selector_tests_relative")?;
        std::fs::write(temp_dir.path().join("Plan.PDF"), "%PDF-1.4")?;

        let selected = resolve_selection(" Plan.PDF ", Some(temp_dir.path()))?;
        assert_eq!(selected, temp_dir.path().join("Plan.PDF"));
        Ok(())
    }

    #[test]
    fn empty_answer_cancels() {
        assert!(matches!(
            resolve_selection("  ", None),
            Err(AppError::UserCancelled)
        ));
    }

    #[test]
    fn rejects_non_pdf_and_missing_files() -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    {
        let temp_dir = tempfile::TempDir::with_prefix("file_selector_tests_invalid")?;
        std::fs::write(temp_dir.path().join("notes.txt"), "text")?;

        assert!(matches!(
            resolve_selection("notes.txt", Some(temp_dir.path())),
            Err(AppError::InvalidInput { .. })
        ));
        assert!(matches!(
            resolve_selection("missing.pdf", Some(temp_dir.path())),
            Err(AppError::InvalidInput { .. })
        ));
        Ok(())
    }
}
