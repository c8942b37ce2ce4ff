use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use covreport_core::{CovError, Host, LogLevel};
use sha2::{Digest, Sha256};

use crate::context::ActionsEnv;

/// [`Host`] implementation speaking the GitHub Actions workflow-command protocol.
///
/// Log lines go to the wrapped writer (stderr in production, leaving stdout
/// to the report). Outputs and the
/// job summary are appended to the files named by `GITHUB_OUTPUT` and
/// `GITHUB_STEP_SUMMARY`; when those are unset the calls are no-ops.
pub struct ActionsHost {
    out: Mutex<Box<dyn Write + Send>>,
    output_path: Option<PathBuf>,
    summary_path: Option<PathBuf>,
}

impl ActionsHost {
    /// Host writing its log to stderr.
    pub fn new(env: &ActionsEnv) -> Self {
        Self::with_writer(env, Box::new(std::io::stderr()))
    }

    /// Host writing its log to `out`.
    pub fn with_writer(env: &ActionsEnv, out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            output_path: env.output_path.clone(),
            summary_path: env.summary_path.clone(),
        }
    }

    /// `true` when step outputs are actually recorded.
    pub fn records_outputs(&self) -> bool {
        self.output_path.is_some()
    }

    fn emit(&self, line: &str) {
        // A poisoned or closed log sink must not abort the run.
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{line}");
            let _ = out.flush();
        }
    }
}

/// Escape workflow-command data so newlines and `%` survive the round trip.
///
/// # Examples
///
/// ```
/// use covreport_github::actions::escape_data;
///
/// assert_eq!(escape_data("50%\nfailed"), "50%25%0Afailed");
/// ```
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn append(path: &Path, content: &str) -> Result<(), CovError> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

// Derived from the payload so it cannot occur inside it by accident.
fn output_delimiter(name: &str, value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(value.as_bytes());
    format!("ghadelimiter_{:x}", hasher.finalize())
}

impl Host for ActionsHost {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => self.emit(message),
            LogLevel::Warning => self.emit(&format!("::warning::{}", escape_data(message))),
            LogLevel::Error => self.emit(&format!("::error::{}", escape_data(message))),
        }
    }

    fn start_group(&self, name: &str) {
        self.emit(&format!("::group::{}", escape_data(name)));
    }

    fn end_group(&self) {
        self.emit("::endgroup::");
    }

    fn set_output(&self, name: &str, value: &str) -> Result<(), CovError> {
        let Some(path) = &self.output_path else {
            return Ok(());
        };
        let delimiter = output_delimiter(name, value);
        if name.contains(&delimiter) || value.contains(&delimiter) {
            return Err(CovError::Config(format!(
                "output '{name}' contains its own delimiter"
            )));
        }
        append(path, &format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"))
    }

    fn write_summary(&self, markdown: &str) -> Result<(), CovError> {
        let Some(path) = &self.summary_path else {
            return Ok(());
        };
        append(path, &format!("{markdown}\n"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn host_with(env: &ActionsEnv) -> (ActionsHost, SharedBuf) {
        let buf = SharedBuf::default();
        (ActionsHost::with_writer(env, Box::new(buf.clone())), buf)
    }

    #[test]
    fn log_levels_use_workflow_commands() {
        let (host, buf) = host_with(&ActionsEnv::default());
        host.start_group("Results");
        host.info("Average coverage 92% \u{2705}");
        host.warning("careful");
        host.error("Modified Files coverage \u{274c}");
        host.end_group();
        assert_eq!(
            buf.text(),
            "::group::Results\n\
             Average coverage 92% \u{2705}\n\
             ::warning::careful\n\
             ::error::Modified Files coverage \u{274c}\n\
             ::endgroup::\n"
        );
    }

    #[test]
    fn error_messages_are_escaped() {
        let (host, buf) = host_with(&ActionsEnv::default());
        host.error("line one\nline two");
        assert_eq!(buf.text(), "::error::line one%0Aline two\n");
    }

    #[test]
    fn outputs_use_multiline_syntax() {
        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("output");
        let env = ActionsEnv {
            output_path: Some(output_path.clone()),
            ..Default::default()
        };
        let (host, _) = host_with(&env);
        host.set_output("pass", "false").unwrap();
        host.set_output("report", "# title\nbody").unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert!(lines[0].starts_with("pass<<ghadelimiter_"));
        assert_eq!(lines[1], "false");
        assert_eq!(lines[2], &lines[0]["pass<<".len()..]);
        assert!(lines[3].starts_with("report<<ghadelimiter_"));
        assert_eq!(lines[4], "# title");
        assert_eq!(lines[5], "body");
        assert_eq!(lines[6], &lines[3]["report<<".len()..]);
        assert!(host.records_outputs());
    }

    #[test]
    fn summary_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let summary_path = dir.path().join("summary.md");
        std::fs::write(&summary_path, "earlier step\n").unwrap();
        let env = ActionsEnv {
            summary_path: Some(summary_path.clone()),
            ..Default::default()
        };
        let (host, _) = host_with(&env);
        host.write_summary("# report").unwrap();
        assert_eq!(
            std::fs::read_to_string(&summary_path).unwrap(),
            "earlier step\n# report\n"
        );
    }

    #[test]
    fn unset_paths_are_noops() {
        let (host, buf) = host_with(&ActionsEnv::default());
        host.set_output("pass", "true").unwrap();
        host.write_summary("# report").unwrap();
        assert!(!host.records_outputs());
        assert!(buf.text().is_empty());
    }

    #[test]
    fn unwritable_summary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let env = ActionsEnv {
            summary_path: Some(dir.path().join("missing-dir").join("summary.md")),
            ..Default::default()
        };
        let (host, _) = host_with(&env);
        assert!(matches!(host.write_summary("x"), Err(CovError::Io(_))));
    }
}
