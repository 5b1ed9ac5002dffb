//! Pipeline-specific error types
//!
//! Everything except `EngineInit` and `InvalidInput` is recovered at the item
//! boundary: the extractor converts it into the `error` string of that item's
//! `PriceObservation` and the run continues.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("navigation to {url} failed: {message}")]
    NavigationFailed { url: String, message: String },

    #[error("no usable search results for query: {query}")]
    NoResultsFound { query: String },

    #[error("all {scanned} scanned results rejected for query: {query}")]
    NoMatchingCandidate { query: String, scanned: usize },

    #[error("no parseable price on product page for query: {query}")]
    NoPriceExtracted { query: String },

    #[error("extraction task failed: {message}")]
    TaskFault { message: String },

    #[error("item extraction exceeded deadline of {timeout:?}")]
    ItemTimeout { timeout: Duration },

    #[error("automation engine failed to initialize: {message}")]
    EngineInit { message: String },

    #[error("input item list is empty or invalid: {message}")]
    InvalidInput { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PipelineError {
    /// Shorthand for engine initialization failures.
    pub fn engine(message: impl Into<String>) -> Self {
        Self::EngineInit {
            message: message.into(),
        }
    }

    /// Shorthand for input validation failures.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Shorthand for faults inside one item's pipeline.
    pub fn fault(message: impl Into<String>) -> Self {
        Self::TaskFault {
            message: message.into(),
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
