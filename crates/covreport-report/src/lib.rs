//! Markdown coverage reports.
//!
//! Provides the table formatting helpers and the report builder that turns a
//! [`covreport_core::CoverageSummary`] into a titled Markdown body plus an
//! overall pass/fail verdict.

pub mod builder;
pub mod format;
