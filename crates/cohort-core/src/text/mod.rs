//! Text preparation: token normalization and lab-table extraction.

mod lab_table;
mod normalizer;

pub use lab_table::*;
pub use normalizer::*;

use thiserror::Error;

/// Text processing errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TextError {
    #[error("Malformed lab table row ({reason}): {line}")]
    MalformedRow { line: String, reason: String },
}

pub type TextResult<T> = Result<T, TextError>;
