//! Core domain types for redaudit

mod artifact;
mod detector;
mod finding;

pub use artifact::{language_for_extension, Artifact, DEFAULT_LANGUAGE};
pub use detector::{DetectorKind, DetectorResult, DetectorStatus};
pub use finding::{Confidence, Finding, Location, Severity};
