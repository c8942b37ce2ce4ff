use covreport_core::{CovConfig, CovError, CoverageSummary, Host, PullRequestContext};
use covreport_report::builder::{build_report, Report};

use crate::github::CommentApi;
use crate::publish::{publish, PublishOutcome};

/// Result of one covreport invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub report: Report,
    /// `None` when no comment was attempted.
    pub comment: Option<PublishOutcome>,
}

/// Build the report, expose it as step outputs, and publish it.
///
/// The report is built inside a `Results` log group. The `report` and `pass`
/// outputs are set before anything touches the network, so they reflect the
/// coverage verdict even if publishing fails. A comment is only attempted
/// when commenting is enabled, the context names a pull request, and `api`
/// is available; otherwise the report goes to the job summary alone.
///
/// # Errors
///
/// Returns an error if an output or the job summary cannot be written.
/// Comment API failures are logged, never returned.
pub async fn run(
    summary: &CoverageSummary,
    context: &PullRequestContext,
    config: &CovConfig,
    host: &dyn Host,
    api: Option<&dyn CommentApi>,
) -> Result<RunResult, CovError> {
    host.start_group("Results");
    let report = build_report(summary, context.head_sha.as_deref(), host);
    host.end_group();

    host.set_output("report", &report.body)?;
    host.set_output("pass", if report.pass { "true" } else { "false" })?;

    let target = match (&context.pull_request, api) {
        _ if !config.comment.enabled => {
            host.info("PR comment disabled by configuration");
            None
        }
        (None, _) => {
            host.info("Not a pull request run; skipping PR comment");
            None
        }
        (Some(_), None) => {
            host.warning("No GitHub client available; skipping PR comment");
            None
        }
        (Some(pr), Some(api)) => Some((pr, api)),
    };

    let comment = match target {
        Some((pr, api)) => Some(publish(api, host, pr, &report.body).await?),
        None => {
            host.write_summary(&report.body)?;
            None
        }
    };

    Ok(RunResult { report, comment })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use covreport_core::{CoverageStat, FileCoverageStat, LogLevel, PullRequestRef};

    use super::*;
    use crate::github::IssueComment;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Log(LogLevel, String),
        StartGroup(String),
        EndGroup,
        Output(String, String),
        Summary(String),
    }

    #[derive(Default)]
    struct RecordingHost(Mutex<Vec<Event>>);

    impl RecordingHost {
        fn events(&self) -> Vec<Event> {
            self.0.lock().unwrap().clone()
        }

        fn output(&self, name: &str) -> Option<String> {
            self.events().into_iter().find_map(|e| match e {
                Event::Output(n, v) if n == name => Some(v),
                _ => None,
            })
        }

        fn summary_count(&self) -> usize {
            self.events()
                .iter()
                .filter(|e| matches!(e, Event::Summary(_)))
                .count()
        }
    }

    impl Host for RecordingHost {
        fn log(&self, level: LogLevel, message: &str) {
            self.0
                .lock()
                .unwrap()
                .push(Event::Log(level, message.to_string()));
        }
        fn start_group(&self, name: &str) {
            self.0.lock().unwrap().push(Event::StartGroup(name.into()));
        }
        fn end_group(&self) {
            self.0.lock().unwrap().push(Event::EndGroup);
        }
        fn set_output(&self, name: &str, value: &str) -> Result<(), CovError> {
            self.0
                .lock()
                .unwrap()
                .push(Event::Output(name.into(), value.into()));
            Ok(())
        }
        fn write_summary(&self, markdown: &str) -> Result<(), CovError> {
            self.0.lock().unwrap().push(Event::Summary(markdown.into()));
            Ok(())
        }
    }

    struct BrokenApi {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl CommentApi for BrokenApi {
        async fn list_comments(&self, _pr: &PullRequestRef) -> Result<Vec<IssueComment>, CovError> {
            *self.calls.lock().unwrap() += 1;
            Err(CovError::GitHub("connection reset".into()))
        }
        async fn create_comment(&self, _pr: &PullRequestRef, _body: &str) -> Result<u64, CovError> {
            *self.calls.lock().unwrap() += 1;
            Err(CovError::GitHub("connection reset".into()))
        }
        async fn update_comment(
            &self,
            _pr: &PullRequestRef,
            _id: u64,
            _body: &str,
        ) -> Result<(), CovError> {
            *self.calls.lock().unwrap() += 1;
            Err(CovError::GitHub("connection reset".into()))
        }
    }

    fn failing_summary() -> CoverageSummary {
        CoverageSummary {
            average_cover: CoverageStat::new(0.92, 0.8),
            new_cover: vec![],
            modified_cover: vec![FileCoverageStat {
                file: "a.py".into(),
                stat: CoverageStat::new(0.5, 0.8),
                missing: vec![],
            }],
        }
    }

    fn pr_context() -> PullRequestContext {
        PullRequestContext {
            pull_request: Some(PullRequestRef::new("o", "r", 9)),
            head_sha: Some("9fceb02d0ae598e95dc970b74767f19372d61af8".into()),
        }
    }

    #[tokio::test]
    async fn outputs_reflect_coverage_even_when_publishing_fails() {
        let host = RecordingHost::default();
        let api = BrokenApi {
            calls: Mutex::new(0),
        };

        let result = run(
            &failing_summary(),
            &pr_context(),
            &CovConfig::default(),
            &host,
            Some(&api),
        )
        .await
        .unwrap();

        assert!(!result.report.pass);
        assert_eq!(result.comment, Some(PublishOutcome::Failed));
        assert_eq!(host.output("pass").as_deref(), Some("false"));
        assert_eq!(host.output("report"), Some(result.report.body.clone()));
        assert_eq!(*api.calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn report_logs_are_grouped() {
        let host = RecordingHost::default();
        run(
            &failing_summary(),
            &PullRequestContext::default(),
            &CovConfig::default(),
            &host,
            None,
        )
        .await
        .unwrap();

        let events = host.events();
        assert_eq!(events[0], Event::StartGroup("Results".into()));
        let end = events.iter().position(|e| *e == Event::EndGroup).unwrap();
        assert!(events[1..end].contains(&Event::Log(
            LogLevel::Error,
            "Modified Files coverage \u{274c}".into()
        )));
    }

    #[tokio::test]
    async fn push_run_writes_summary_only() {
        let host = RecordingHost::default();
        let result = run(
            &failing_summary(),
            &PullRequestContext::default(),
            &CovConfig::default(),
            &host,
            None,
        )
        .await
        .unwrap();

        assert_eq!(result.comment, None);
        assert_eq!(host.summary_count(), 1);
    }

    #[tokio::test]
    async fn disabled_comment_skips_api() {
        let host = RecordingHost::default();
        let api = BrokenApi {
            calls: Mutex::new(0),
        };
        let mut config = CovConfig::default();
        config.comment.enabled = false;

        let result = run(&failing_summary(), &pr_context(), &config, &host, Some(&api))
            .await
            .unwrap();

        assert_eq!(result.comment, None);
        assert_eq!(*api.calls.lock().unwrap(), 0);
        assert_eq!(host.summary_count(), 1);
    }

    #[tokio::test]
    async fn missing_client_warns_and_writes_summary() {
        let host = RecordingHost::default();
        run(&failing_summary(), &pr_context(), &CovConfig::default(), &host, None)
            .await
            .unwrap();

        assert!(host.events().contains(&Event::Log(
            LogLevel::Warning,
            "No GitHub client available; skipping PR comment".into()
        )));
        assert_eq!(host.summary_count(), 1);
    }

    #[tokio::test]
    async fn footer_uses_context_sha() {
        let host = RecordingHost::default();
        let result = run(
            &failing_summary(),
            &pr_context(),
            &CovConfig::default(),
            &host,
            None,
        )
        .await
        .unwrap();
        assert!(result.report.body.contains("`9fceb02`"));
    }
}
