//! Confusion counts and the rates derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{EvalError, EvalResult};
use crate::models::{Criterion, Label};

/// Divide, reporting 0.0 for an empty denominator.
fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Confusion-matrix counts for one polarity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    #[serde(rename = "TP")]
    pub true_pos: usize,
    #[serde(rename = "TN")]
    pub true_neg: usize,
    #[serde(rename = "FP")]
    pub false_pos: usize,
    #[serde(rename = "FN")]
    pub false_neg: usize,
}

impl ConfusionCounts {
    /// Count outcomes for paired labels, treating `Met` as positive.
    pub fn from_labels(truth: &[Label], pred: &[Label]) -> EvalResult<Self> {
        if truth.len() != pred.len() {
            return Err(EvalError::LengthMismatch {
                truth: truth.len(),
                pred: pred.len(),
            });
        }

        let mut counts = Self::default();
        for (t, p) in truth.iter().zip(pred) {
            match (t.is_met(), p.is_met()) {
                (true, true) => counts.true_pos += 1,
                (false, false) => counts.true_neg += 1,
                (false, true) => counts.false_pos += 1,
                (true, false) => counts.false_neg += 1,
            }
        }
        Ok(counts)
    }

    /// Pool two count sets.
    pub fn add(&self, other: &Self) -> Self {
        Self {
            true_pos: self.true_pos + other.true_pos,
            true_neg: self.true_neg + other.true_neg,
            false_pos: self.false_pos + other.false_pos,
            false_neg: self.false_neg + other.false_neg,
        }
    }

    /// Counts with `NotMet` as the positive class.
    pub fn invert(&self) -> Self {
        Self {
            true_pos: self.true_neg,
            true_neg: self.true_pos,
            false_pos: self.false_neg,
            false_neg: self.false_pos,
        }
    }

    pub fn total(&self) -> usize {
        self.true_pos + self.true_neg + self.false_pos + self.false_neg
    }

    fn tp(&self) -> f64 {
        self.true_pos as f64
    }

    fn tn(&self) -> f64 {
        self.true_neg as f64
    }

    fn fp(&self) -> f64 {
        self.false_pos as f64
    }

    fn fn_(&self) -> f64 {
        self.false_neg as f64
    }

    /// Precision.
    pub fn ppv(&self) -> f64 {
        ratio(self.tp(), self.tp() + self.fp())
    }

    /// Recall, sensitivity.
    pub fn tpr(&self) -> f64 {
        ratio(self.tp(), self.tp() + self.fn_())
    }

    /// Specificity.
    pub fn tnr(&self) -> f64 {
        ratio(self.tn(), self.tn() + self.fp())
    }

    /// Fall-out.
    pub fn fpr(&self) -> f64 {
        ratio(self.fp(), self.fp() + self.tn())
    }

    /// Miss rate.
    pub fn fnr(&self) -> f64 {
        ratio(self.fn_(), self.fn_() + self.tp())
    }

    pub fn npv(&self) -> f64 {
        ratio(self.tn(), self.tn() + self.fn_())
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp() + self.tn(), self.total() as f64)
    }

    /// Harmonic mean of precision and recall.
    pub fn f1(&self) -> f64 {
        let (precision, recall) = (self.ppv(), self.tpr());
        ratio(2.0 * precision * recall, precision + recall)
    }

    /// Matthews correlation coefficient.
    pub fn mcc(&self) -> f64 {
        let num = self.tp() * self.tn() - self.fp() * self.fn_();
        let den = ((self.tp() + self.fp())
            * (self.tp() + self.fn_())
            * (self.tn() + self.fp())
            * (self.tn() + self.fn_()))
        .sqrt();
        ratio(num, den)
    }

    /// Diagnostic odds ratio.
    pub fn dor(&self) -> f64 {
        ratio(self.tp() * self.tn(), self.fp() * self.fn_())
    }
}

/// Counts plus headline rates for one polarity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarityMetrics {
    #[serde(flatten)]
    pub counts: ConfusionCounts,
    #[serde(rename = "PPV")]
    pub ppv: f64,
    #[serde(rename = "TPR")]
    pub tpr: f64,
    #[serde(rename = "F1")]
    pub f1: f64,
}

impl From<ConfusionCounts> for PolarityMetrics {
    fn from(counts: ConfusionCounts) -> Self {
        Self {
            counts,
            ppv: counts.ppv(),
            tpr: counts.tpr(),
            f1: counts.f1(),
        }
    }
}

/// Met and not-met results for one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionMetrics {
    pub met: PolarityMetrics,
    #[serde(rename = "not met")]
    pub not_met: PolarityMetrics,
    /// Mean of the two F1 scores
    #[serde(rename = "overall F1")]
    pub overall_f1: f64,
}

impl CriterionMetrics {
    /// Build from met-polarity counts; not-met counts are their inverse.
    pub fn from_counts(met: ConfusionCounts) -> Self {
        let met = PolarityMetrics::from(met);
        let not_met = PolarityMetrics::from(met.counts.invert());
        Self {
            overall_f1: (met.f1 + not_met.f1) / 2.0,
            met,
            not_met,
        }
    }
}

/// Pooled counts across all criteria.
pub type MicroMetrics = CriterionMetrics;

/// Rates without counts, for macro averages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RateMetrics {
    #[serde(rename = "PPV")]
    pub ppv: f64,
    #[serde(rename = "TPR")]
    pub tpr: f64,
    #[serde(rename = "F1")]
    pub f1: f64,
}

impl RateMetrics {
    fn mean<'a>(items: impl Iterator<Item = &'a PolarityMetrics>) -> Self {
        let mut sum = Self::default();
        let mut n = 0usize;
        for item in items {
            sum.ppv += item.ppv;
            sum.tpr += item.tpr;
            sum.f1 += item.f1;
            n += 1;
        }
        let n = n as f64;
        Self {
            ppv: ratio(sum.ppv, n),
            tpr: ratio(sum.tpr, n),
            f1: ratio(sum.f1, n),
        }
    }
}

/// Per-criterion rates averaged with equal weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroMetrics {
    pub met: RateMetrics,
    #[serde(rename = "not met")]
    pub not_met: RateMetrics,
    #[serde(rename = "overall F1")]
    pub overall_f1: f64,
}

/// Full evaluation of one prediction set against gold labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub patients: usize,
    pub criteria: BTreeMap<Criterion, CriterionMetrics>,
    pub micro: MicroMetrics,
    #[serde(rename = "macro")]
    pub macro_avg: MacroMetrics,
}

impl Metrics {
    /// Aggregate per-criterion met counts.
    pub fn from_counts(patients: usize, counts: &BTreeMap<Criterion, ConfusionCounts>) -> Self {
        let criteria: BTreeMap<Criterion, CriterionMetrics> = counts
            .iter()
            .map(|(c, counts)| (*c, CriterionMetrics::from_counts(*counts)))
            .collect();

        let pooled = counts
            .values()
            .fold(ConfusionCounts::default(), |acc, c| acc.add(c));
        let micro = CriterionMetrics::from_counts(pooled);

        let met = RateMetrics::mean(criteria.values().map(|m| &m.met));
        let not_met = RateMetrics::mean(criteria.values().map(|m| &m.not_met));
        let macro_avg = MacroMetrics {
            overall_f1: (met.f1 + not_met.f1) / 2.0,
            met,
            not_met,
        };

        Self {
            patients,
            criteria,
            micro,
            macro_avg,
        }
    }

    pub fn criterion(&self, criterion: Criterion) -> Option<&CriterionMetrics> {
        self.criteria.get(&criterion)
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
