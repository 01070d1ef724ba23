//! Audit orchestration: per-detector isolation and the fixed detector schedule

mod controller;
mod isolator;

pub use controller::{AuditPipeline, DetectorSet};
pub use isolator::{Isolator, TimeoutPolicy};
