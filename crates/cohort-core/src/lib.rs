//! Cohort-Selection Core Library
//!
//! Rule-based eligibility classification for the n2c2 2018 cohort
//! selection task: 13 binary criteria per patient, decided from
//! longitudinal clinical notes.
//!
//! # Architecture
//!
//! ```text
//! Patient XML → Records (dated, month offsets)
//!                   │
//!         recency window per criterion
//!                   │
//!                   ▼
//!              Document ──► Lab-Table Extractor ──► Normalizer
//!                   │
//!                   ▼
//!     ┌─────────────────────────────┐
//!     │  RuleSet (baseline|improved) │──► Label per patient
//!     │  MajorityClassifier          │
//!     └─────────────────────────────┘
//!                   │
//!                   ▼
//!     Evaluator (gold vs predicted) ──► Metrics / text table
//! ```
//!
//! # Modules
//!
//! - [`models`]: Criterion, Label, Patient, Record
//! - [`text`]: Token normalizer and lab-table extraction
//! - [`rules`]: Criterion matchers, rule sets, majority baseline
//! - [`eval`]: Confusion counts, micro/macro metrics, report table
//! - [`corpus`]: Patient XML reading and writing

pub mod corpus;
pub mod eval;
pub mod models;
pub mod rules;
pub mod text;

// Re-export commonly used types
pub use corpus::{Corpus, WriteOptions};
pub use eval::{evaluate, render_table, ConfusionCounts, Metrics};
pub use models::{Criterion, Label, Labels, Patient, Record};
pub use rules::{
    Classifier, CriterionMatcher, DrugGazetteer, MajorityClassifier, RuleSet, RuleSetVersion,
};
pub use text::{normalize, LabTableExtractor};

/// Any error raised by this crate.
#[derive(Debug, thiserror::Error)]
pub enum CohortError {
    #[error("Corpus error: {0}")]
    Corpus(#[from] corpus::CorpusError),

    #[error("Rule error: {0}")]
    Rule(#[from] rules::RuleError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] eval::EvalError),

    #[error("Text error: {0}")]
    Text(#[from] text::TextError),

    #[error("Label error: {0}")]
    Label(#[from] models::LabelError),
}

pub type CohortResult<T> = Result<T, CohortError>;

/// Score two corpora over the same patients.
pub fn evaluate_corpora(gold: &Corpus, pred: &Corpus) -> CohortResult<Metrics> {
    Ok(evaluate(&gold.labeled(), &pred.labeled())?)
}
