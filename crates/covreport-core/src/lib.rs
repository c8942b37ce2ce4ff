//! Core types, configuration, and error handling for covreport.
//!
//! This crate provides the shared foundation used by the other covreport crates:
//! - [`CovError`] — unified error type using `thiserror` and `miette`
//! - [`CovConfig`] — configuration loaded from `.covreport.toml`
//! - Coverage data: [`CoverageSummary`], [`CoverageStat`], [`FileCoverageStat`]
//! - [`Host`] — the CI run's log, outputs, and job summary

mod config;
mod error;
mod host;
mod summary;
mod types;

pub use config::{CommentConfig, CovConfig, ThresholdConfig};
pub use error::CovError;
pub use host::{Host, LogLevel};
pub use types::{
    CoverageStat, CoverageSummary, FileCoverageStat, OutputFormat, PullRequestContext,
    PullRequestRef,
};

/// A convenience `Result` type for covreport operations.
pub type Result<T> = std::result::Result<T, CovError>;
