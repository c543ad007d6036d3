//! Evaluation of predicted labels against gold labels.

mod metrics;
mod report;

pub use metrics::*;
pub use report::*;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::{Criterion, Label, Labels};

/// Evaluation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Gold and predicted patients differ: {0}")]
    PatientMismatch(String),

    #[error("Label vectors differ in length: {truth} gold vs {pred} predicted")]
    LengthMismatch { truth: usize, pred: usize },
}

pub type EvalResult<T> = Result<T, EvalError>;

fn check_patients(gold: &[(&str, &Labels)], pred: &[(&str, &Labels)]) -> EvalResult<()> {
    if gold.len() != pred.len() {
        return Err(EvalError::PatientMismatch(format!(
            "{} gold patients vs {} predicted",
            gold.len(),
            pred.len()
        )));
    }
    for (position, ((g, _), (p, _))) in gold.iter().zip(pred).enumerate() {
        if g != p {
            return Err(EvalError::PatientMismatch(format!(
                "position {}: gold {:?} vs predicted {:?}",
                position, g, p
            )));
        }
    }
    Ok(())
}

/// Score predictions for the same patients, in the same order.
pub fn evaluate(gold: &[(&str, &Labels)], pred: &[(&str, &Labels)]) -> EvalResult<Metrics> {
    check_patients(gold, pred)?;

    let mut counts = BTreeMap::new();
    for criterion in Criterion::ALL {
        let truth: Vec<Label> = gold.iter().map(|(_, l)| l.get(criterion)).collect();
        let guess: Vec<Label> = pred.iter().map(|(_, l)| l.get(criterion)).collect();
        counts.insert(criterion, ConfusionCounts::from_labels(&truth, &guess)?);
    }

    log::debug!("Evaluated {} patients", gold.len());
    Ok(Metrics::from_counts(gold.len(), &counts))
}
