use std::fmt;

use crate::error::CovError;

/// Severity of a message sent to the CI host's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// The CI run that hosts covreport: its log, named outputs, and job summary.
///
/// Implemented for GitHub Actions in `covreport-github`; tests use recording
/// fakes.
pub trait Host: Send + Sync {
    /// Write a line to the run log.
    fn log(&self, level: LogLevel, message: &str);

    /// Open a collapsible log group. Groups do not nest.
    fn start_group(&self, name: &str);

    /// Close the group opened by [`Host::start_group`].
    fn end_group(&self);

    /// Expose `value` to later workflow steps under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`CovError::Io`] if the output cannot be recorded.
    fn set_output(&self, name: &str, value: &str) -> Result<(), CovError>;

    /// Append Markdown to the run's job summary.
    ///
    /// # Errors
    ///
    /// Returns [`CovError::Io`] if the summary cannot be written.
    fn write_summary(&self, markdown: &str) -> Result<(), CovError>;

    /// Log `message` at info level.
    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log `message` as a warning.
    fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    /// Log `message` as an error.
    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}
