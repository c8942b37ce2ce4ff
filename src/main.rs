use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use miette::{Context, IntoDiagnostic, Result};

use covreport_core::{CovConfig, CoverageSummary, OutputFormat};
use covreport_github::actions::ActionsHost;
use covreport_github::context::ActionsEnv;
use covreport_github::github::{parse_pr_reference, CommentApi, GitHubClient};
use covreport_github::run::run;

#[derive(Parser)]
#[command(
    name = "covreport",
    version,
    about = "Coverage reports for pull requests",
    long_about = "covreport turns a coverage summary into a Markdown report, decides pass/fail\n\
                   against thresholds, and keeps a single report comment up to date on the PR.\n\n\
                   Examples:\n  \
                     covreport report --summary coverage.json      Inside a GitHub Actions job\n  \
                     collector | covreport report                  Read the summary from stdin\n  \
                     covreport report --pr owner/repo#1 --sha abc  Outside of Actions\n  \
                     covreport init                                Create a .covreport.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .covreport.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "markdown",
        long_help = "Output format for the report printed to stdout.\n\n\
                       Formats:\n  \
                         markdown  The report exactly as published (default)\n  \
                         json      {\"pass\": bool, \"report\": string}\n  \
                         text      The report followed by a PASS/FAIL line"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Build the coverage report and publish it to the pull request
    #[command(long_about = "Build the coverage report and publish it to the pull request.\n\n\
        Reads a JSON coverage summary, renders the Markdown report, sets the `report` and\n\
        `pass` step outputs, writes the job summary, and creates or updates the single\n\
        report comment on the pull request.\n\n\
        Examples:\n  covreport report --summary coverage.json\n  covreport report --pr owner/repo#12 --fail-on-low-coverage")]
    Report {
        /// Read the coverage summary from a file instead of stdin
        #[arg(long)]
        summary: Option<PathBuf>,
        /// Pull request to comment on (format: owner/repo#123)
        #[arg(
            long,
            long_help = "Pull request to comment on.\n\nFormat: owner/repo#123\nDefaults to the pull request of the triggering GitHub Actions event."
        )]
        pr: Option<String>,
        /// Head commit SHA shown in the report footer
        #[arg(long)]
        sha: Option<String>,
        /// GitHub token (default: GITHUB_TOKEN env var)
        #[arg(long)]
        github_token: Option<String>,
        /// Do not create or update the PR comment
        #[arg(long)]
        no_comment: bool,
        /// Exit with non-zero code if coverage does not pass
        #[arg(
            long,
            long_help = "Exit with non-zero code if the overall verdict is a fail.\n\n\
                The verdict is the AND of the average coverage and every new and\n\
                modified file meeting its threshold."
        )]
        fail_on_low_coverage: bool,
    },
    /// Create a default .covreport.toml configuration file
    #[command(long_about = "Create a default .covreport.toml configuration file.\n\n\
        Generates a commented template with all available options.\n\
        Fails if .covreport.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

const DEFAULT_CONFIG: &str = r#"# covreport configuration

[thresholds]
# Used only when the coverage summary leaves out a stat's threshold.
# overall = 0.8
# new_files = 0.8
# modified_files = 0.8

[comment]
# Create or update the report comment on the pull request.
# enabled = true
"#;

fn read_summary_input(file: &Option<PathBuf>, config: &CovConfig) -> Result<CoverageSummary> {
    match file {
        Some(path) => CoverageSummary::from_file(path, &config.thresholds)
            .wrap_err(format!("reading {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .into_diagnostic()
                .wrap_err("reading stdin")?;
            Ok(CoverageSummary::from_json(&input, &config.thresholds)?)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<CovConfig> {
    match path {
        Some(path) => Ok(CovConfig::from_file(path)?),
        None => {
            let default_path = Path::new(".covreport.toml");
            if default_path.exists() {
                Ok(CovConfig::from_file(default_path)?)
            } else {
                Ok(CovConfig::default())
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    if cli.verbose {
        eprintln!("format: {}", cli.format);
        eprintln!(
            "thresholds: overall {}, new files {}, modified files {}",
            config.thresholds.overall,
            config.thresholds.new_files,
            config.thresholds.modified_files,
        );
    }

    match cli.command {
        None => {
            let mut cmd = Cli::command();
            cmd.print_help().into_diagnostic()?;
        }
        Some(Command::Report {
            ref summary,
            ref pr,
            ref sha,
            ref github_token,
            no_comment,
            fail_on_low_coverage,
        }) => {
            if no_comment {
                config.comment.enabled = false;
            }
            let summary = read_summary_input(summary, &config)?;

            let env = ActionsEnv::from_env();
            let mut context = env
                .pull_request_context()
                .wrap_err("reading GitHub Actions event payload")?;
            if let Some(pr_ref) = pr {
                context.pull_request = Some(parse_pr_reference(pr_ref)?);
            }
            if let Some(sha) = sha {
                context.head_sha = Some(sha.clone());
            }

            let host = ActionsHost::new(&env);

            let client = if config.comment.enabled && context.pull_request.is_some() {
                match GitHubClient::new(github_token.as_deref()) {
                    Ok(client) => Some(client),
                    Err(e) => {
                        eprintln!("warning: {e}");
                        None
                    }
                }
            } else {
                None
            };

            if cli.verbose {
                eprintln!("github actions: {}", env.is_actions());
                match &context.pull_request {
                    Some(pr) => eprintln!("pull request: {pr}"),
                    None => eprintln!("pull request: none"),
                }
                eprintln!(
                    "head sha: {}",
                    context.head_sha.as_deref().unwrap_or("unknown")
                );
            }

            let api = client.as_ref().map(|c| c as &dyn CommentApi);
            let result = run(&summary, &context, &config, &host, api).await?;

            if cli.verbose {
                if !host.records_outputs() {
                    eprintln!("GITHUB_OUTPUT not set; outputs not recorded");
                    eprintln!("pass={}", result.report.pass);
                }
                if let Some(outcome) = result.comment {
                    eprintln!("{outcome}");
                }
            }

            match cli.format {
                OutputFormat::Json => {
                    let json = serde_json::json!({
                        "pass": result.report.pass,
                        "report": result.report.body,
                    });
                    println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
                }
                OutputFormat::Markdown => {
                    println!("{}", result.report.body);
                }
                OutputFormat::Text => {
                    println!("{}\n", result.report.body);
                    println!(
                        "Coverage: {}",
                        if result.report.pass { "PASS" } else { "FAIL" }
                    );
                }
            }

            if fail_on_low_coverage && !result.report.pass {
                std::process::exit(1);
            }
        }
        Some(Command::Init) => {
            let path = Path::new(".covreport.toml");
            if path.exists() {
                miette::bail!(".covreport.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .covreport.toml with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "covreport", &mut std::io::stdout());
        }
    }

    Ok(())
}
