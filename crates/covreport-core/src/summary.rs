use std::path::Path;

use serde::Deserialize;

use crate::config::ThresholdConfig;
use crate::error::CovError;
use crate::types::{CoverageStat, CoverageSummary, FileCoverageStat};

// Collector output before thresholds are applied. Every judgement field is
// optional so a bare `{ "ratio": 0.5 }` is accepted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStat {
    ratio: Option<f64>,
    covered: Option<u64>,
    total: Option<u64>,
    threshold: Option<f64>,
    pass: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFile {
    file: String,
    #[serde(flatten)]
    stat: RawStat,
    #[serde(default)]
    missing: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSummary {
    average_cover: RawStat,
    #[serde(default)]
    new_cover: Option<Vec<RawFile>>,
    #[serde(default)]
    modified_cover: Option<Vec<RawFile>>,
}

impl RawStat {
    fn resolve(self, what: &str, default_threshold: f64) -> Result<CoverageStat, CovError> {
        let covered = self.covered.unwrap_or(0);
        let total = self.total.unwrap_or(0);
        let ratio = match (self.ratio, total) {
            (Some(r), _) => r,
            (None, t) if t > 0 => covered as f64 / t as f64,
            (None, _) => {
                return Err(CovError::Parse(format!(
                    "{what}: needs either `ratio` or non-zero `total`"
                )))
            }
        };
        if !(0.0..=1.0).contains(&ratio) {
            return Err(CovError::Parse(format!(
                "{what}: ratio {ratio} is outside 0.0..=1.0"
            )));
        }
        let threshold = self.threshold.unwrap_or(default_threshold);
        Ok(CoverageStat {
            ratio,
            covered,
            total,
            threshold,
            pass: self.pass.unwrap_or(ratio >= threshold),
        })
    }
}

fn resolve_files(
    files: Option<Vec<RawFile>>,
    default_threshold: f64,
) -> Result<Vec<FileCoverageStat>, CovError> {
    files
        .unwrap_or_default()
        .into_iter()
        .map(|f| {
            let stat = f.stat.resolve(&f.file, default_threshold)?;
            Ok(FileCoverageStat {
                file: f.file,
                stat,
                missing: f.missing,
            })
        })
        .collect()
}

impl CoverageSummary {
    /// Parse a collector's JSON summary, filling in missing thresholds and
    /// pass flags from `thresholds`.
    ///
    /// Values the collector supplied are kept as-is. `null` or absent file
    /// lists become empty lists.
    ///
    /// # Errors
    ///
    /// Returns [`CovError::Parse`] if the JSON is malformed, `averageCover` is
    /// missing, or a stat has no usable ratio.
    ///
    /// # Examples
    ///
    /// ```
    /// use covreport_core::{CoverageSummary, ThresholdConfig};
    ///
    /// let json = r#"{
    ///     "averageCover": { "ratio": 0.92 },
    ///     "newCover": null,
    ///     "modifiedCover": [{ "file": "a.py", "ratio": 0.5, "pass": false }]
    /// }"#;
    /// let summary = CoverageSummary::from_json(json, &ThresholdConfig::default()).unwrap();
    /// assert!(summary.average_cover.pass);
    /// assert!(summary.new_cover.is_empty());
    /// assert!(!summary.modified_cover[0].stat.pass);
    /// ```
    pub fn from_json(content: &str, thresholds: &ThresholdConfig) -> Result<Self, CovError> {
        let raw: RawSummary = serde_json::from_str(content)
            .map_err(|e| CovError::Parse(format!("invalid coverage summary: {e}")))?;
        Ok(Self {
            average_cover: raw
                .average_cover
                .resolve("averageCover", thresholds.overall)?,
            new_cover: resolve_files(raw.new_cover, thresholds.new_files)?,
            modified_cover: resolve_files(raw.modified_cover, thresholds.modified_files)?,
        })
    }

    /// Read and parse a summary file. See [`CoverageSummary::from_json`].
    ///
    /// # Errors
    ///
    /// Returns [`CovError::FileNotFound`] if `path` does not exist, plus
    /// everything [`CoverageSummary::from_json`] can return.
    pub fn from_file(path: &Path, thresholds: &ThresholdConfig) -> Result<Self, CovError> {
        if !path.exists() {
            return Err(CovError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content, thresholds)
    }
}
