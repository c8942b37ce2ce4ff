use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A coverage ratio judged against a threshold.
///
/// # Examples
///
/// ```
/// use covreport_core::CoverageStat;
///
/// let stat = CoverageStat::new(0.92, 0.8);
/// assert!(stat.pass);
///
/// let stat = CoverageStat::new(0.5, 0.8);
/// assert!(!stat.pass);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageStat {
    /// Covered fraction (0.0–1.0).
    pub ratio: f64,
    /// Number of covered lines, 0 when the collector did not report counts.
    #[serde(default)]
    pub covered: u64,
    /// Number of coverable lines, 0 when the collector did not report counts.
    #[serde(default)]
    pub total: u64,
    /// Ratio required to pass.
    pub threshold: f64,
    /// Whether `ratio` met `threshold`.
    pub pass: bool,
}

impl CoverageStat {
    /// Create a stat from a ratio, deriving the pass flag from `threshold`.
    pub fn new(ratio: f64, threshold: f64) -> Self {
        Self {
            ratio,
            covered: 0,
            total: 0,
            threshold,
            pass: ratio >= threshold,
        }
    }

    /// Attach covered/total line counts.
    ///
    /// # Examples
    ///
    /// ```
    /// use covreport_core::CoverageStat;
    ///
    /// let stat = CoverageStat::new(0.75, 0.8).with_lines(75, 100);
    /// assert_eq!(stat.covered, 75);
    /// assert_eq!(stat.total, 100);
    /// ```
    pub fn with_lines(mut self, covered: u64, total: u64) -> Self {
        self.covered = covered;
        self.total = total;
        self
    }
}

/// Coverage for a single file touched by the pull request.
///
/// # Examples
///
/// ```
/// use covreport_core::{CoverageStat, FileCoverageStat};
///
/// let file = FileCoverageStat {
///     file: "src/app.py".into(),
///     stat: CoverageStat::new(0.5, 0.8),
///     missing: vec!["10-14".into()],
/// };
/// assert!(!file.stat.pass);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCoverageStat {
    /// Repository-relative file path.
    pub file: String,
    /// Coverage numbers for the file.
    #[serde(flatten)]
    pub stat: CoverageStat,
    /// Uncovered line ranges such as `"3-7"`.
    #[serde(default)]
    pub missing: Vec<String>,
}

/// Everything the report is built from.
///
/// Empty `new_cover` or `modified_cover` lists are normal: the pull request
/// simply touched no covered files of that kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    /// Repository-wide average coverage.
    pub average_cover: CoverageStat,
    /// Files added by the pull request.
    #[serde(default)]
    pub new_cover: Vec<FileCoverageStat>,
    /// Files modified by the pull request.
    #[serde(default)]
    pub modified_cover: Vec<FileCoverageStat>,
}

/// A pull request on GitHub.
///
/// # Examples
///
/// ```
/// use covreport_core::PullRequestRef;
///
/// let pr = PullRequestRef::new("octocat", "hello-world", 42);
/// assert_eq!(pr.to_string(), "octocat/hello-world#42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Pull request number.
    pub number: u64,
}

impl PullRequestRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// What the CI host knows about the pull request under test.
///
/// Both fields are optional: runs triggered by `push` have no pull request,
/// and some payloads omit the head commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestContext {
    /// The pull request to comment on, if any.
    pub pull_request: Option<PullRequestRef>,
    /// Head commit SHA of the pull request.
    pub head_sha: Option<String>,
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use covreport_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The Markdown report followed by a plain status line.
    Text,
    /// Machine-readable JSON: `{ "pass": bool, "report": string }`.
    Json,
    /// The Markdown report exactly as published.
    #[default]
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
