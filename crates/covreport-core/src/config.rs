use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CovError;

/// Top-level configuration loaded from `.covreport.toml`.
///
/// Supports layered resolution: CLI flags > env vars > local config > defaults.
///
/// # Examples
///
/// ```
/// use covreport_core::CovConfig;
///
/// let config = CovConfig::default();
/// assert_eq!(config.thresholds.overall, 0.8);
/// assert!(config.comment.enabled);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CovConfig {
    /// Fallback thresholds for stats the collector did not judge itself.
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    /// Pull-request comment behavior.
    #[serde(default)]
    pub comment: CommentConfig,
}

impl CovConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CovError::FileNotFound`] if the file does not exist,
    /// [`CovError::Io`] if it cannot be read, or [`CovError::Toml`] if the
    /// content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use covreport_core::CovConfig;
    /// use std::path::Path;
    ///
    /// let config = CovConfig::from_file(Path::new(".covreport.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, CovError> {
        if !path.exists() {
            return Err(CovError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`CovError::Toml`] if parsing fails, or [`CovError::Config`]
    /// if a threshold lies outside `0.0..=1.0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use covreport_core::CovConfig;
    ///
    /// let toml = r#"
    /// [thresholds]
    /// new_files = 0.9
    /// "#;
    /// let config = CovConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.thresholds.new_files, 0.9);
    /// assert_eq!(config.thresholds.overall, 0.8);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, CovError> {
        let config: Self = toml::from_str(content)?;
        config.thresholds.validate()?;
        Ok(config)
    }
}

/// Coverage ratios a stat must reach to pass, as fractions in `0.0..=1.0`.
///
/// Only consulted for stats whose `threshold` or `pass` the collector left
/// out of the summary.
///
/// # Examples
///
/// ```
/// use covreport_core::ThresholdConfig;
///
/// let config = ThresholdConfig::default();
/// assert_eq!(config.new_files, 0.8);
/// assert_eq!(config.modified_files, 0.8);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Threshold for the repository-wide average (default: 0.8).
    #[serde(default = "default_threshold")]
    pub overall: f64,
    /// Threshold for each file added by the pull request (default: 0.8).
    #[serde(default = "default_threshold")]
    pub new_files: f64,
    /// Threshold for each file modified by the pull request (default: 0.8).
    #[serde(default = "default_threshold")]
    pub modified_files: f64,
}

fn default_threshold() -> f64 {
    0.8
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            overall: default_threshold(),
            new_files: default_threshold(),
            modified_files: default_threshold(),
        }
    }
}

impl ThresholdConfig {
    fn validate(&self) -> Result<(), CovError> {
        for (name, value) in [
            ("overall", self.overall),
            ("new_files", self.new_files),
            ("modified_files", self.modified_files),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CovError::Config(format!(
                    "thresholds.{name} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Pull-request comment configuration.
///
/// # Examples
///
/// ```
/// use covreport_core::CommentConfig;
///
/// assert!(CommentConfig::default().enabled);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentConfig {
    /// Create or update the report comment on the pull request (default: true).
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = CovConfig::default();
        assert_eq!(config.thresholds.overall, 0.8);
        assert_eq!(config.thresholds.new_files, 0.8);
        assert_eq!(config.thresholds.modified_files, 0.8);
        assert!(config.comment.enabled);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[thresholds]
overall = 0.75
new_files = 0.95
modified_files = 0.6

[comment]
enabled = false
"#;
        let config = CovConfig::from_toml(toml).unwrap();
        assert_eq!(config.thresholds.overall, 0.75);
        assert_eq!(config.thresholds.new_files, 0.95);
        assert_eq!(config.thresholds.modified_files, 0.6);
        assert!(!config.comment.enabled);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = CovConfig::from_toml("").unwrap();
        assert_eq!(config.thresholds.overall, 0.8);
        assert!(config.comment.enabled);
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = CovConfig::from_toml("{{invalid}}");
        assert!(matches!(result, Err(CovError::Toml(_))));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let result = CovConfig::from_toml("[thresholds]\noverall = 80.0\n");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("thresholds.overall"));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".covreport.toml");
        let err = CovConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, CovError::FileNotFound(p) if p == path));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".covreport.toml");
        std::fs::write(&path, "[comment]\nenabled = false\n").unwrap();
        let config = CovConfig::from_file(&path).unwrap();
        assert!(!config.comment.enabled);
    }
}
