//! ADVANCED-CAD: two or more kinds of coronary complication.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use super::patterns::unnegated_trigger;
use super::{CriterionMatcher, DrugGazetteer};
use crate::models::Criterion;

lazy_static! {
    static ref MI: Regex = Regex::new(
        r"(?i)(?P<left>.{0,40})\b(?:myocardial infarction|MI|IMI|AMI|ASMI|HMI|NQWMI|NSTEMI|OASMI|SEMI|STEMI|TIMI)\b(?P<right>.{0,20})"
    )
    .unwrap();

    static ref ANGINA: Regex =
        Regex::new(r"(?i)(?P<left>.{0,40})\bangina\b(?P<right>.{0,20})").unwrap();

    static ref ISCHEMIA: Regex =
        Regex::new(r"(?i)(?P<left>.{0,40})\bischemia\b(?P<right>.{0,20})").unwrap();
}

/// Minimum distinct CAD drugs that count as one complication.
const MIN_DRUGS: usize = 2;

/// Minimum complication kinds for the criterion.
const MIN_COMPLICATIONS: usize = 2;

/// Counts drug therapy, MI, angina and ischemia, each at most once.
pub struct AdvancedCad {
    gazetteer: Arc<DrugGazetteer>,
    negation: &'static Regex,
}

impl AdvancedCad {
    pub fn new(gazetteer: Arc<DrugGazetteer>, negation: &'static Regex) -> Self {
        Self { gazetteer, negation }
    }

    pub fn complications(&self, document: &str) -> usize {
        let drugs = self.gazetteer.distinct_matches(document) >= MIN_DRUGS;
        let mentions = [&*MI, &*ANGINA, &*ISCHEMIA]
            .iter()
            .filter(|trigger| unnegated_trigger(trigger, self.negation, self.negation, document))
            .count();
        usize::from(drugs) + mentions
    }
}

impl CriterionMatcher for AdvancedCad {
    fn criterion(&self) -> Criterion {
        Criterion::AdvancedCad
    }

    fn is_met(&self, document: &str) -> bool {
        self.complications(document) >= MIN_COMPLICATIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    lazy_static! {
        static ref NEG: Regex = Regex::new(r"(?i)\b(?:no|denies|father)\b").unwrap();
    }

    fn matcher() -> AdvancedCad {
        let gazetteer = DrugGazetteer::from_names(&["aspirin", "metoprolol", "plavix"]).unwrap();
        AdvancedCad::new(Arc::new(gazetteer), &NEG)
    }

    #[test]
    fn test_single_evidence_type() {
        let cad = matcher();
        assert_eq!(cad.complications("Patient reports exertional angina."), 1);
        assert!(!cad.is_met("Patient reports exertional angina."));
    }

    #[test]
    fn test_two_evidence_types() {
        let cad = matcher();
        let doc = "Patient reports exertional angina. Stress test showed ischemia in the inferior wall.";
        assert_eq!(cad.complications(doc), 2);
        assert!(cad.is_met(doc));
    }

    #[test]
    fn test_drugs_need_two_distinct_names() {
        let cad = matcher();
        assert_eq!(cad.complications("aspirin, ASPIRIN"), 0);
        assert_eq!(cad.complications("aspirin, plavix"), 1);
        assert!(cad.is_met("Meds: aspirin, metoprolol. Stable angina on exertion."));
    }

    #[test]
    fn test_negated_mentions_do_not_count() {
        let cad = matcher();
        assert!(!cad.is_met("Father had an MI. Denies angina today."));
    }

    #[test]
    fn test_repeats_count_once() {
        let cad = matcher();
        assert!(!cad.is_met("angina. angina again. more angina"));
    }
}
