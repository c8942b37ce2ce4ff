use covreport_core::{CoverageStat, FileCoverageStat};

/// Row indicator for a stat that met its threshold.
pub const PASS_ICON: &str = "\u{1f7e2}";
/// Row indicator for a stat below its threshold.
pub const FAIL_ICON: &str = "\u{1f534}";

/// A rendered Markdown table and whether every row in it passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableResult {
    pub cover_table: String,
    pub pass: bool,
}

/// Format a 0.0–1.0 ratio as a whole percentage.
///
/// # Examples
///
/// ```
/// use covreport_report::format::to_percent;
///
/// assert_eq!(to_percent(0.5), "50%");
/// assert_eq!(to_percent(0.926), "93%");
/// assert_eq!(to_percent(1.0), "100%");
/// ```
pub fn to_percent(ratio: f64) -> String {
    format!("{}%", (ratio * 100.0).round() as i64)
}

fn status_icon(pass: bool) -> &'static str {
    if pass {
        PASS_ICON
    } else {
        FAIL_ICON
    }
}

fn line_count(stat: &CoverageStat, n: u64) -> String {
    if stat.total == 0 {
        "-".into()
    } else {
        n.to_string()
    }
}

// File paths may legally contain `|`, which would split a table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Render the repository-wide average as a one-row table.
///
/// The result passes exactly when the stat does.
///
/// # Examples
///
/// ```
/// use covreport_core::CoverageStat;
/// use covreport_report::format::format_average_table;
///
/// let table = format_average_table(&CoverageStat::new(0.92, 0.8).with_lines(92, 100));
/// assert!(table.pass);
/// assert!(table.cover_table.contains("| 100 | 92 | 92% | 80% |"));
/// ```
pub fn format_average_table(average: &CoverageStat) -> TableResult {
    let mut table = String::from(
        "| Lines | Covered | Coverage | Threshold | Status |\n\
         | :---: | :-----: | :------: | :-------: | :----: |\n",
    );
    table.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n",
        line_count(average, average.total),
        line_count(average, average.covered),
        to_percent(average.ratio),
        to_percent(average.threshold),
        status_icon(average.pass),
    ));
    TableResult {
        cover_table: table,
        pass: average.pass,
    }
}

/// Render one row per file.
///
/// The result passes when every file passes, so an empty slice passes.
pub fn format_files_table(files: &[FileCoverageStat]) -> TableResult {
    let mut table = String::from(
        "| File | Coverage | Threshold | Status | Missing |\n\
         | :--- | :------: | :-------: | :----: | :------ |\n",
    );
    let mut pass = true;
    for f in files {
        pass = pass && f.stat.pass;
        table.push_str(&format!(
            "| `{}` | {} | {} | {} | {} |\n",
            escape_cell(&f.file),
            to_percent(f.stat.ratio),
            to_percent(f.stat.threshold),
            status_icon(f.stat.pass),
            escape_cell(&f.missing.join(", ")),
        ));
    }
    TableResult {
        cover_table: table,
        pass,
    }
}
