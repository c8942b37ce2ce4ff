use covreport_core::{CoverageSummary, FileCoverageStat, Host};

use crate::format::{format_average_table, format_files_table, to_percent};

/// Heading that starts every report.
///
/// Existing pull-request comments are recognized by this prefix, so it must
/// stay the same from one release to the next.
pub const TITLE: &str = "# \u{2602}\u{fe0f} Coverage Report";

/// Placeholder body for the new-files section when the PR adds no covered files.
pub const NO_NEW_FILES: &str = "No new covered files...";

/// Placeholder body for the modified-files section when the PR modifies no covered files.
pub const NO_MODIFIED_FILES: &str = "No covered modified files...";

const ACTION_LINK: &str = "[action](https://github.com/marketplace/actions/python-coverage)";
const SHORT_SHA_LEN: usize = 7;

/// A rendered coverage report and its overall verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Markdown body, starting with [`TITLE`].
    pub body: String,
    /// `true` when the average and every new/modified file met their thresholds.
    pub pass: bool,
}

struct Section {
    markdown: String,
    pass: bool,
}

// `kind` is "New" or "Modified"; passing sections log it with a lower-case "files".
fn files_section(
    host: &dyn Host,
    kind: &str,
    files: &[FileCoverageStat],
    placeholder: &str,
) -> Section {
    let heading = format!("{kind} Files");
    if files.is_empty() {
        host.info(&format!(
            "No covered {} files in this PR",
            kind.to_lowercase()
        ));
        return Section {
            markdown: format!("\n## {heading}\n{placeholder}"),
            pass: true,
        };
    }

    let table = format_files_table(files);
    if table.pass {
        host.info(&format!("{kind} files coverage \u{2705}"));
    } else {
        host.error(&format!("{heading} coverage \u{274c}"));
    }
    Section {
        markdown: format!("\n## {heading}\n{}", table.cover_table),
        pass: table.pass,
    }
}

/// First seven characters of `sha`, or an empty string when it is unknown.
///
/// # Examples
///
/// ```
/// use covreport_report::builder::short_sha;
///
/// assert_eq!(short_sha(Some("0123456789abcdef0123456789abcdef01234567")), "0123456");
/// assert_eq!(short_sha(None), "");
/// ```
pub fn short_sha(sha: Option<&str>) -> String {
    sha.map(|s| s.chars().take(SHORT_SHA_LEN).collect())
        .unwrap_or_default()
}

/// Render `summary` as a Markdown report and decide whether it passes.
///
/// Each section is logged through `host`: passing sections at info level,
/// failing ones at error level. Empty new/modified file lists render a
/// placeholder and count as passing. A missing `head_sha` leaves the commit
/// field of the footer blank.
///
/// # Examples
///
/// ```
/// # use covreport_core::{CovError, Host, LogLevel};
/// # struct Quiet;
/// # impl Host for Quiet {
/// #     fn log(&self, _: LogLevel, _: &str) {}
/// #     fn start_group(&self, _: &str) {}
/// #     fn end_group(&self) {}
/// #     fn set_output(&self, _: &str, _: &str) -> Result<(), CovError> { Ok(()) }
/// #     fn write_summary(&self, _: &str) -> Result<(), CovError> { Ok(()) }
/// # }
/// use covreport_core::{CoverageStat, CoverageSummary};
/// use covreport_report::builder::{build_report, TITLE};
///
/// let summary = CoverageSummary {
///     average_cover: CoverageStat::new(0.92, 0.8),
///     new_cover: vec![],
///     modified_cover: vec![],
/// };
/// let report = build_report(&summary, Some("abcdef0123"), &Quiet);
/// assert!(report.pass);
/// assert!(report.body.starts_with(TITLE));
/// assert!(report.body.contains("`abcdef0`"));
/// ```
pub fn build_report(summary: &CoverageSummary, head_sha: Option<&str>, host: &dyn Host) -> Report {
    let mut pass = true;
    let mut sections = String::new();

    let average = format_average_table(&summary.average_cover);
    pass = pass && average.pass;
    sections.push_str(&format!("\n## Overall Coverage\n{}", average.cover_table));
    let percent = to_percent(summary.average_cover.ratio);
    if average.pass {
        host.info(&format!("Average coverage {percent} \u{2705}"));
    } else {
        host.error(&format!("Average coverage {percent} \u{274c}"));
    }

    let new_files = files_section(host, "New", &summary.new_cover, NO_NEW_FILES);
    pass = pass && new_files.pass;
    sections.push_str(&new_files.markdown);

    let modified = files_section(host, "Modified", &summary.modified_cover, NO_MODIFIED_FILES);
    pass = pass && modified.pass;
    sections.push_str(&modified.markdown);

    sections.push_str(&format!(
        "\n\n\n> **updated for commit: `{}` by {ACTION_LINK}\u{1f40d}**",
        short_sha(head_sha)
    ));

    let banner = if pass { "\u{2705}" } else { "\u{274c}" };
    Report {
        body: format!("{TITLE}\n> current status: {banner}{sections}"),
        pass,
    }
}
