//! Domain models for cohort selection.

mod criterion;
mod label;
mod patient;

pub use criterion::*;
pub use label::*;
pub use patient::*;
