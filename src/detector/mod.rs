//! Detector adapters
//!
//! Each adapter wraps one analysis engine behind the [`Detector`] trait and
//! normalizes what it finds into [`crate::Finding`]s. Adapters never panic or
//! return errors to the caller; every fault ends up in the [`crate::DetectorResult`].

mod error;
mod runner;

pub mod exploit;
pub mod semantic;
pub mod static_analysis;

pub use error::AdapterError;
pub(crate) use error::panic_message;
pub use exploit::ExploitCheckAdapter;
pub use runner::{Detector, DetectorContext, DetectorOutput};
pub use semantic::{LanguageModel, SemanticReviewAdapter};
pub use static_analysis::StaticAnalysisAdapter;
