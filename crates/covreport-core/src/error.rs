use std::path::PathBuf;

/// Errors that can occur across covreport.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate converts to `miette::Report` at the boundary.
///
/// # Examples
///
/// ```
/// use covreport_core::CovError;
///
/// let err = CovError::Config("missing GITHUB_REPOSITORY".into());
/// assert!(err.to_string().contains("missing GITHUB_REPOSITORY"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum CovError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(covreport::io))]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(covreport::config))]
    Config(String),

    /// GitHub API failure.
    #[error("GitHub error: {0}")]
    #[diagnostic(code(covreport::github))]
    GitHub(String),

    /// Coverage summary could not be understood.
    #[error("parse error: {0}")]
    #[diagnostic(
        code(covreport::parse),
        help("the coverage summary must be JSON with an `averageCover` object")
    )]
    Parse(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(covreport::serialization))]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(covreport::toml))]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    #[diagnostic(code(covreport::file_not_found))]
    FileNotFound(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CovError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn github_error_displays_message() {
        let err = CovError::GitHub("rate limited".into());
        assert_eq!(err.to_string(), "GitHub error: rate limited");
    }

    #[test]
    fn file_not_found_shows_path() {
        let err = CovError::FileNotFound(PathBuf::from("/tmp/coverage.json"));
        assert!(err.to_string().contains("/tmp/coverage.json"));
    }

    #[test]
    fn json_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CovError = json_err.into();
        assert!(err.to_string().starts_with("serialization error"));
    }
}
