use crate::config::ConsoleSection;
use crate::AppResult;
use console::Term;
use indicatif::ProgressBar;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Console log of the application.
///
/// Messages go either straight to the terminal or above a running spinner, and are
/// kept in a bounded history.
#[derive(Debug, Clone)]
pub struct AppReporter {
    inner: AppReporterInner,
    history: Arc<Mutex<ConsoleHistory>>,
    msg_format: Arc<str>,
    sounds: bool,
}

#[derive(Debug, Clone)]
enum AppReporterInner {
    Term(Term),
    ProgressBar(ProgressBar),
}

impl AppReporter {
    pub fn new(term: &Term, console: &ConsoleSection, sounds: bool) -> Self {
        AppReporter {
            inner: AppReporterInner::Term(term.clone()),
            history: Arc::new(Mutex::new(ConsoleHistory::new(
                console.limit_messages_console,
            ))),
            msg_format: Arc::from(console.msg_format.as_str()),
            sounds,
        }
    }

    /// Same log, printed above `progress_bar` while it runs.
    pub fn with_progress_bar(&self, progress_bar: &ProgressBar) -> Self {
        AppReporter {
            inner: AppReporterInner::ProgressBar(progress_bar.clone()),
            ..self.clone()
        }
    }

    pub fn report<S>(&self, message: S) -> AppResult<()>
    where
        S: AsRef<str>,
    {
        let line = self.record(message.as_ref(), true);
        self.write_line(message.as_ref(), line)
    }

    /// Reports a message prefixed with the current time.
    pub fn report_timed<S>(&self, message: S) -> AppResult<()>
    where
        S: AsRef<str>,
    {
        let formatted = format_message(&self.msg_format, &current_time(), message.as_ref());
        self.report(formatted)
    }

    /// Starts a line that the next message completes, e.g. "Loading file... OK".
    pub fn report_pending<S>(&self, message: S) -> AppResult<()>
    where
        S: AsRef<str>,
    {
        let formatted = format_message(&self.msg_format, &current_time(), message.as_ref());
        self.record(&formatted, false);
        match &self.inner {
            AppReporterInner::Term(term) => Ok(term.write_str(&formatted)?),
            // Spinner output is line based.
            AppReporterInner::ProgressBar(_) => Ok(()),
        }
    }

    /// Completes a line started with [`AppReporter::report_pending`].
    pub fn complete_pending<S>(&self, message: S) -> AppResult<()>
    where
        S: AsRef<str>,
    {
        let line = self.record(message.as_ref(), true);
        self.write_line(message.as_ref(), line)
    }

    /// Rings the terminal bell when sounds are enabled.
    pub fn alert(&self) -> AppResult<()> {
        if self.sounds {
            match &self.inner {
                AppReporterInner::Term(term) => term.write_str("\x07")?,
                AppReporterInner::ProgressBar(progress_bar) => progress_bar.println("\x07"),
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|history| history.lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn record(&self, message: &str, ends_line: bool) -> String {
        match self.history.lock() {
            Ok(mut history) => history.push(message, ends_line),
            Err(_) => message.to_string(),
        }
    }

    /// The terminal gets `message` only, the spinner needs the whole `line`.
    fn write_line(&self, message: &str, line: String) -> AppResult<()> {
        match &self.inner {
            AppReporterInner::Term(term) => Ok(term.write_line(message)?),
            AppReporterInner::ProgressBar(progress_bar) => {
                progress_bar.println(line);
                Ok(())
            }
        }
    }
}

#[derive(Debug)]
struct ConsoleHistory {
    lines: VecDeque<String>,
    limit: usize,
    continue_last: bool,
}

impl ConsoleHistory {
    fn new(limit: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            limit: limit.max(1),
            continue_last: false,
        }
    }

    /// Returns the full line the message ended up in.
    fn push(&mut self, message: &str, ends_line: bool) -> String {
        let is_duplicate = !self.continue_last && self.lines.back().is_some_and(|l| l == message);
        if !is_duplicate {
            match self.lines.back_mut() {
                Some(last) if self.continue_last => last.push_str(message),
                _ => self.lines.push_back(message.to_string()),
            }
            while self.lines.len() > self.limit {
                self.lines.pop_front();
            }
        }
        self.continue_last = !ends_line;
        self.lines.back().cloned().unwrap_or_default()
    }
}

fn current_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

pub fn format_message(msg_format: &str, time: &str, message: &str) -> String {
    msg_format
        .replace("{time}", time)
        .replace("{message}", message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_reporter(limit: usize) -> AppReporter {
        let term = Term::stdout();
        AppReporter::new(
            &term,
            &ConsoleSection {
                msg_format: "[{time}] {message}".to_string(),
                limit_messages_console: limit,
            },
            false,
        )
    }

    #[test]
    fn history_drops_duplicates_and_oldest() -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    {
        let reporter = test_reporter(2);
        reporter.report("first")?;
        reporter.report("second")?;
        reporter.report("second")?;
        reporter.report("third")?;
        assert_eq!(reporter.history(), vec!["second", "third"]);
        Ok(())
    }

    #[test]
    fn pending_lines_are_completed() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let reporter = test_reporter(10);
        reporter.report_pending("Loading file... ")?;
        reporter.complete_pending("OK")?;
        reporter.report("next")?;
        let history = reporter.history();
        assert_eq!(history.len(), 2);
        assert!(history[0].ends_with("Loading file... OK"));
        assert!(history[0].starts_with('['));
        assert_eq!(history[1], "next");
        Ok(())
    }

    #[test]
    fn format_message_test() {
        assert_eq!(
            format_message("{time} - {message}", "10:00:00", "Done"),
            "10:00:00 - Done"
        );
    }
}
