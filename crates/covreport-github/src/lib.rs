//! GitHub integration for covreport.
//!
//! Provides the GitHub Actions host (workflow commands, step outputs, job
//! summary), event-payload context, the `octocrab` issue-comment client, the
//! single-comment publisher, and the end-to-end run.

pub mod actions;
pub mod context;
pub mod github;
pub mod publish;
pub mod run;
