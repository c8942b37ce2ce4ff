use std::fmt;

use covreport_core::{CovError, Host, PullRequestRef};
use covreport_report::builder::TITLE;

use crate::github::{CommentApi, IssueComment};

/// What happened to the report comment on a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// No report comment existed; a new one was added.
    Created(u64),
    /// The existing report comment was rewritten in place.
    Updated(u64),
    /// The create or update call failed. The failure has already been logged.
    Failed,
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishOutcome::Created(id) => write!(f, "Created coverage comment {id}"),
            PublishOutcome::Updated(id) => write!(f, "Updated coverage comment {id}"),
            PublishOutcome::Failed => write!(f, "Coverage comment not published"),
        }
    }
}

/// The first comment whose body starts with the report title, if any.
///
/// # Examples
///
/// ```
/// use covreport_github::github::IssueComment;
/// use covreport_github::publish::find_report_comment;
///
/// let comments = vec![
///     IssueComment { id: 1, body: "LGTM".into() },
///     IssueComment { id: 2, body: "# \u{2602}\u{fe0f} Coverage Report\n...".into() },
/// ];
/// assert_eq!(find_report_comment(&comments).map(|c| c.id), Some(2));
/// ```
pub fn find_report_comment(comments: &[IssueComment]) -> Option<&IssueComment> {
    comments.iter().find(|c| c.body.starts_with(TITLE))
}

async fn existing_report_comment(
    api: &dyn CommentApi,
    pr: &PullRequestRef,
) -> Result<Option<u64>, CovError> {
    let comments = api.list_comments(pr).await?;
    Ok(find_report_comment(&comments).map(|c| c.id))
}

async fn upsert(
    api: &dyn CommentApi,
    pr: &PullRequestRef,
    existing: Option<u64>,
    body: &str,
) -> Result<PublishOutcome, CovError> {
    match existing {
        Some(id) => {
            api.update_comment(pr, id, body).await?;
            Ok(PublishOutcome::Updated(id))
        }
        None => {
            let id = api.create_comment(pr, body).await?;
            Ok(PublishOutcome::Created(id))
        }
    }
}

/// Publish `body` to the job summary and as the single report comment on `pr`.
///
/// The summary is written first. Comment failures never propagate: a failed
/// listing is logged and treated as "no existing comment", and a failed create
/// or update is logged and reported as [`PublishOutcome::Failed`]. Nothing is
/// retried.
///
/// Two concurrent runs on the same pull request can both see no comment and
/// both create one; the list-then-write sequence is not atomic.
///
/// # Errors
///
/// Returns an error only when the job summary cannot be written.
pub async fn publish(
    api: &dyn CommentApi,
    host: &dyn Host,
    pr: &PullRequestRef,
    body: &str,
) -> Result<PublishOutcome, CovError> {
    host.write_summary(body)?;

    let existing = match existing_report_comment(api, pr).await {
        Ok(id) => id,
        Err(e) => {
            host.error(&format!("Failed to list comments on {pr}: {e}"));
            None
        }
    };

    match upsert(api, pr, existing, body).await {
        Ok(outcome) => {
            host.info(&format!("{outcome} on {pr}"));
            Ok(outcome)
        }
        Err(e) => {
            let action = if existing.is_some() { "update" } else { "create" };
            host.error(&format!("Failed to {action} coverage comment on {pr}: {e}"));
            Ok(PublishOutcome::Failed)
        }
    }
}
