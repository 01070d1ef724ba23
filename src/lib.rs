//! redaudit - security audit pipeline
//!
//! Audits a piece of source code with three detectors and merges what they
//! find into one report:
//!
//! 1. **Static analysis**: an external Semgrep-compatible engine run over a
//!    scratch copy of the code.
//! 2. **Exploit check**: an in-process scanner for known-dangerous patterns.
//! 3. **Semantic review**: a language model that reads the code together with
//!    the summaries of the first two detectors.
//!
//! Each detector runs under its own time budget and every fault is captured in
//! its result, so an audit always yields a report. When any detector did not
//! succeed the report is marked `partial`.

pub mod config;
pub mod detector;
pub mod domain;
pub mod pipeline;
pub mod report;

pub use domain::*;
pub use pipeline::{AuditPipeline, DetectorSet, TimeoutPolicy};
pub use report::{synthesize, AuditReport, OverallStatus, SynthesisError};
