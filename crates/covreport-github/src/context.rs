use std::path::PathBuf;

use covreport_core::{CovError, PullRequestContext, PullRequestRef};
use serde::Deserialize;

use crate::github::parse_repository;

/// The GitHub Actions environment variables covreport reads.
///
/// Every field is optional: outside of Actions they are simply absent and the
/// tool degrades to printing the report.
#[derive(Debug, Clone, Default)]
pub struct ActionsEnv {
    /// `GITHUB_REPOSITORY`, as `owner/repo`.
    pub repository: Option<String>,
    /// `GITHUB_EVENT_PATH`, the webhook payload that triggered the run.
    pub event_path: Option<PathBuf>,
    /// `GITHUB_OUTPUT`, the file step outputs are appended to.
    pub output_path: Option<PathBuf>,
    /// `GITHUB_STEP_SUMMARY`, the file the job summary is appended to.
    pub summary_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: Option<PayloadPullRequest>,
}

#[derive(Debug, Deserialize)]
struct PayloadPullRequest {
    number: u64,
    head: Option<PayloadHead>,
}

#[derive(Debug, Deserialize)]
struct PayloadHead {
    sha: Option<String>,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl ActionsEnv {
    /// Read the environment of the current process.
    pub fn from_env() -> Self {
        Self {
            repository: non_empty_var("GITHUB_REPOSITORY"),
            event_path: non_empty_var("GITHUB_EVENT_PATH").map(PathBuf::from),
            output_path: non_empty_var("GITHUB_OUTPUT").map(PathBuf::from),
            summary_path: non_empty_var("GITHUB_STEP_SUMMARY").map(PathBuf::from),
        }
    }

    /// `true` when running inside a GitHub Actions job.
    pub fn is_actions(&self) -> bool {
        self.event_path.is_some() || self.output_path.is_some()
    }

    /// Resolve the pull request and head commit from the event payload.
    ///
    /// Events without a `pull_request` object (e.g. `push`) produce an empty
    /// context rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`CovError::Io`] if the payload file cannot be read,
    /// [`CovError::Serialization`] if it is not JSON, or [`CovError::Config`]
    /// if `GITHUB_REPOSITORY` is malformed.
    pub fn pull_request_context(&self) -> Result<PullRequestContext, CovError> {
        let Some(path) = &self.event_path else {
            return Ok(PullRequestContext::default());
        };
        let payload = std::fs::read_to_string(path)?;
        context_from_payload(self.repository.as_deref(), &payload)
    }
}

/// Build a context from `GITHUB_REPOSITORY` and an event payload.
///
/// # Errors
///
/// See [`ActionsEnv::pull_request_context`].
///
/// # Examples
///
/// ```
/// use covreport_github::context::context_from_payload;
///
/// let payload = r#"{ "pull_request": { "number": 7, "head": { "sha": "abc1234def" } } }"#;
/// let ctx = context_from_payload(Some("octocat/hello-world"), payload).unwrap();
/// assert_eq!(ctx.pull_request.unwrap().number, 7);
/// assert_eq!(ctx.head_sha.as_deref(), Some("abc1234def"));
/// ```
pub fn context_from_payload(
    repository: Option<&str>,
    payload: &str,
) -> Result<PullRequestContext, CovError> {
    let event: EventPayload = serde_json::from_str(payload)?;
    let Some(pr) = event.pull_request else {
        return Ok(PullRequestContext::default());
    };

    let pull_request = match repository {
        Some(r) => {
            let (owner, repo) = parse_repository(r)?;
            Some(PullRequestRef::new(owner, repo, pr.number))
        }
        None => None,
    };

    Ok(PullRequestContext {
        pull_request,
        head_sha: pr.head.and_then(|h| h.sha),
    })
}
