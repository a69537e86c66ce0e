use crate::app_state::AppState;
use crate::session::Session;
use crate::AppResult;
use console::{Style, Term};

pub async fn command_session(term: &Term, state: &AppState, clear: bool) -> AppResult<()> {
    let bold_style = Style::new().bold();
    let dimmed_style = Style::new().dim();
    let session_path = state.config.session_file_path();
    if clear {
        Session::clear(&session_path).await?;
        term.write_line(
            format!(
                "Session {} cleared.",
                bold_style.apply_to(session_path.display().to_string())
            )
            .as_str(),
        )?;
        return Ok(());
    }

    let or_none = |value: &str| {
        if value.is_empty() {
            dimmed_style.apply_to("(none)".to_string())
        } else {
            bold_style.apply_to(value.to_string())
        }
    };
    term.write_line(
        format!(
            "Session file: {}\nLast folder: {}\nLast file: {}\nRemember last folder: {}",
            dimmed_style.apply_to(session_path.display().to_string()),
            or_none(&state.session.last_folder),
            or_none(&state.session.last_loaded_file),
            state.config.remember_last_folder
        )
        .as_str(),
    )?;
    Ok(())
}
