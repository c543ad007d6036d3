//! Majority-class predictor, a reference point for the rule sets.

use super::{Classifier, RuleResult};
use crate::models::{Criterion, Label};

/// Predicts the training-set majority class for every document.
#[derive(Debug, Default, Clone, Copy)]
pub struct MajorityClassifier;

impl MajorityClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Majority class per criterion.
    pub fn majority(criterion: Criterion) -> Label {
        match criterion {
            Criterion::Abdominal
            | Criterion::AlcoholAbuse
            | Criterion::Creatinine
            | Criterion::DietSupp2Mos
            | Criterion::DrugAbuse
            | Criterion::Hba1c
            | Criterion::Keto1Yr
            | Criterion::Mi6Mos => Label::NotMet,
            Criterion::AdvancedCad
            | Criterion::AspForMi
            | Criterion::English
            | Criterion::MajorDiabetes
            | Criterion::MakesDecisions => Label::Met,
        }
    }
}

impl Classifier for MajorityClassifier {
    fn name(&self) -> &str {
        "majority"
    }

    fn supports(&self, _criterion: Criterion) -> bool {
        true
    }

    fn predict(&self, criterion: Criterion, documents: &[String]) -> RuleResult<Vec<Label>> {
        Ok(vec![Self::majority(criterion); documents.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority_labels() {
        let docs = vec!["a".to_string(), "b".to_string()];
        let classifier = MajorityClassifier::new();

        assert_eq!(
            classifier.predict(Criterion::Abdominal, &docs).unwrap(),
            vec![Label::NotMet, Label::NotMet]
        );
        assert_eq!(
            classifier.predict(Criterion::MajorDiabetes, &docs).unwrap(),
            vec![Label::Met, Label::Met]
        );
        assert!(classifier.predict(Criterion::Hba1c, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_supports_everything() {
        let classifier = MajorityClassifier::new();
        assert!(Criterion::ALL.iter().all(|c| classifier.supports(*c)));
        let met = Criterion::ALL
            .iter()
            .filter(|c| MajorityClassifier::majority(**c).is_met())
            .count();
        assert_eq!(met, 5);
    }
}
