//! Typed errors for the recoverable, parse-level part of the pipeline.
//!
//! Everything here is recovered at or below the extraction dispatcher and
//! surfaces as a logged diagnostic plus a null field, never as a run abort.
//! Infrastructure failures (HTTP, storage, geocoding) stay `anyhow` errors at
//! the engine boundary.

use thiserror::Error;

/// Anomalies raised while extracting a single field from a listing document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The element lookup matched an unexpected number of nodes.
    #[error("{actual} {field} found for the listing, instead of expected {expected}")]
    WrongCount {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The matched text could not be converted to the field's numeric type.
    #[error("unparseable {field} text: {text:?}")]
    Unparseable { field: &'static str, text: String },
}

impl ExtractError {
    pub fn wrong_count(field: &'static str, expected: usize, actual: usize) -> Self {
        Self::WrongCount {
            field,
            expected,
            actual,
        }
    }

    pub fn unparseable(field: &'static str, text: impl Into<String>) -> Self {
        Self::Unparseable {
            field,
            text: text.into(),
        }
    }
}
