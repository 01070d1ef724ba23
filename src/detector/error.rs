//! Error taxonomy for detector adapters

use std::any::Any;
use std::time::Duration;

use crate::{DetectorKind, DetectorResult};

/// Everything that can go wrong inside a detector adapter
///
/// These never leave the adapter boundary as errors; they are folded into a
/// [`DetectorResult`] by [`AdapterError::into_result`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum AdapterError {
    #[error("exceeded time budget of {}ms", .budget.as_millis())]
    Timeout { budget: Duration },

    /// Nonzero exit, spawn failure, unreachable endpoint, panicking checker
    #[error("process failure: {message}")]
    ProcessFailure {
        message: String,
        /// Whatever the detector wrote before it failed
        output: String,
    },

    #[error("unparseable output: {message}")]
    ParseFailure { message: String, output: String },
}

impl AdapterError {
    pub fn process(message: impl Into<String>) -> Self {
        AdapterError::ProcessFailure {
            message: message.into(),
            output: String::new(),
        }
    }

    pub fn process_with_output(message: impl Into<String>, output: impl Into<String>) -> Self {
        AdapterError::ProcessFailure {
            message: message.into(),
            output: output.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        AdapterError::ParseFailure {
            message: message.into(),
            output: String::new(),
        }
    }

    pub fn parse_with_output(message: impl Into<String>, output: impl Into<String>) -> Self {
        AdapterError::ParseFailure {
            message: message.into(),
            output: output.into(),
        }
    }

    /// Fold this error into the detector's result
    pub fn into_result(self, detector: DetectorKind) -> DetectorResult {
        let message = self.to_string();
        match self {
            AdapterError::Timeout { .. } => DetectorResult::timed_out(detector, message),
            AdapterError::ProcessFailure { output, .. }
            | AdapterError::ParseFailure { output, .. } => {
                DetectorResult::failed(detector, message, output)
            }
        }
    }
}

/// Best-effort text of a caught panic payload
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
