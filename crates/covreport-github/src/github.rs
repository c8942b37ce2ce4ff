use async_trait::async_trait;
use covreport_core::{CovError, PullRequestRef};
use octocrab::models::CommentId;

/// A comment on a pull request's conversation tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueComment {
    pub id: u64,
    /// Markdown body; empty when GitHub returned none.
    pub body: String,
}

/// The three issue-comment operations the publisher needs.
///
/// [`GitHubClient`] talks to the real API; tests substitute in-memory fakes.
#[async_trait]
pub trait CommentApi: Send + Sync {
    /// List every comment on the pull request, in the order GitHub returns them.
    async fn list_comments(&self, pr: &PullRequestRef) -> Result<Vec<IssueComment>, CovError>;

    /// Add a new comment and return its id.
    async fn create_comment(&self, pr: &PullRequestRef, body: &str) -> Result<u64, CovError>;

    /// Replace the body of an existing comment.
    async fn update_comment(
        &self,
        pr: &PullRequestRef,
        comment_id: u64,
        body: &str,
    ) -> Result<(), CovError>;
}

/// GitHub issue-comment client backed by `octocrab`.
///
/// # Examples
///
/// ```no_run
/// use covreport_core::PullRequestRef;
/// use covreport_github::github::{CommentApi, GitHubClient};
///
/// # async fn demo() -> Result<(), covreport_core::CovError> {
/// let client = GitHubClient::new(None)?;
/// let pr = PullRequestRef::new("octocat", "hello-world", 42);
/// let id = client.create_comment(&pr, "# \u{2602}\u{fe0f} Coverage Report").await?;
/// client.update_comment(&pr, id, "# \u{2602}\u{fe0f} Coverage Report\nupdated").await?;
/// # Ok(())
/// # }
/// ```
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
}

impl GitHubClient {
    /// Create a client from an explicit token or the `GITHUB_TOKEN` environment variable.
    ///
    /// `GITHUB_API_URL` is honored so the client also works on GitHub Enterprise runners.
    ///
    /// # Errors
    ///
    /// Returns [`CovError::Config`] if no token is available, or
    /// [`CovError::GitHub`] if the client cannot be built.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use covreport_github::github::GitHubClient;
    ///
    /// let client = GitHubClient::new(Some("ghp_xxxx")).unwrap();
    /// ```
    pub fn new(token: Option<&str>) -> Result<Self, CovError> {
        let token = match token {
            Some(t) => t.to_string(),
            None => std::env::var("GITHUB_TOKEN").map_err(|_| {
                CovError::Config(
                    "GITHUB_TOKEN not set. Pass --github-token or set GITHUB_TOKEN env var".into(),
                )
            })?,
        };

        let mut builder = octocrab::Octocrab::builder().personal_token(token);
        if let Ok(api_url) = std::env::var("GITHUB_API_URL") {
            builder = builder
                .base_uri(api_url.as_str())
                .map_err(|e| CovError::Config(format!("invalid GITHUB_API_URL '{api_url}': {e}")))?;
        }
        let octocrab = builder
            .build()
            .map_err(|e| CovError::GitHub(format!("failed to create GitHub client: {e}")))?;

        Ok(Self { octocrab })
    }
}

#[async_trait]
impl CommentApi for GitHubClient {
    async fn list_comments(&self, pr: &PullRequestRef) -> Result<Vec<IssueComment>, CovError> {
        let first = self
            .octocrab
            .issues(&pr.owner, &pr.repo)
            .list_comments(pr.number)
            .per_page(100)
            .send()
            .await
            .map_err(|e| CovError::GitHub(format!("failed to list comments: {e}")))?;

        let comments = self
            .octocrab
            .all_pages(first)
            .await
            .map_err(|e| CovError::GitHub(format!("failed to page through comments: {e}")))?;

        Ok(comments
            .into_iter()
            .map(|c| IssueComment {
                id: c.id.into_inner(),
                body: c.body.unwrap_or_default(),
            })
            .collect())
    }

    async fn create_comment(&self, pr: &PullRequestRef, body: &str) -> Result<u64, CovError> {
        let comment = self
            .octocrab
            .issues(&pr.owner, &pr.repo)
            .create_comment(pr.number, body)
            .await
            .map_err(|e| CovError::GitHub(format!("failed to create comment: {e}")))?;
        Ok(comment.id.into_inner())
    }

    async fn update_comment(
        &self,
        pr: &PullRequestRef,
        comment_id: u64,
        body: &str,
    ) -> Result<(), CovError> {
        self.octocrab
            .issues(&pr.owner, &pr.repo)
            .update_comment(CommentId(comment_id), body)
            .await
            .map_err(|e| CovError::GitHub(format!("failed to update comment {comment_id}: {e}")))?;
        Ok(())
    }
}

/// Parse a PR reference string (`owner/repo#number`) into its components.
///
/// # Errors
///
/// Returns [`CovError::Config`] if the format is invalid.
///
/// # Examples
///
/// ```
/// use covreport_github::github::parse_pr_reference;
///
/// let pr = parse_pr_reference("octocat/hello-world#42").unwrap();
/// assert_eq!(pr.owner, "octocat");
/// assert_eq!(pr.repo, "hello-world");
/// assert_eq!(pr.number, 42);
/// ```
pub fn parse_pr_reference(pr_ref: &str) -> Result<PullRequestRef, CovError> {
    let Some((owner_repo, number_str)) = pr_ref.split_once('#') else {
        return Err(CovError::Config(format!(
            "invalid PR reference '{pr_ref}', expected owner/repo#number"
        )));
    };
    let (owner, repo) = parse_repository(owner_repo)?;
    let number: u64 = number_str
        .parse()
        .map_err(|_| CovError::Config(format!("invalid PR number: {number_str}")))?;
    Ok(PullRequestRef::new(owner, repo, number))
}

/// Split `owner/repo` as found in `GITHUB_REPOSITORY`.
///
/// # Errors
///
/// Returns [`CovError::Config`] if either half is missing.
pub fn parse_repository(owner_repo: &str) -> Result<(&str, &str), CovError> {
    match owner_repo.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => Ok((owner, repo)),
        _ => Err(CovError::Config(format!(
            "invalid repository '{owner_repo}', expected owner/repo"
        ))),
    }
}
