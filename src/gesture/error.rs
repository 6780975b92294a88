//! Error definitions for the gesture module

use thiserror::Error;

/// Errors raised at the gesture module's boundaries.
///
/// The classifier's `update` never returns these; they come from settings
/// validation and from checking observations that arrive from outside.
#[derive(Debug, Error)]
pub enum GestureError {
    /// A classifier setting is out of its allowed range
    #[error("Invalid setting `{field}`: {reason}")]
    InvalidSetting { field: &'static str, reason: String },

    /// An observation violates the detector contract
    #[error("Malformed observation: {0}")]
    MalformedObservation(String),
}

impl GestureError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            field,
            reason: reason.into(),
        }
    }
}
