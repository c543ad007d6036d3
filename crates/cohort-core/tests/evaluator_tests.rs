//! Evaluator properties and report layout.

use cohort_core::eval::{evaluate, render_table, ConfusionCounts, EvalError};
use cohort_core::models::{Criterion, Label, Labels};
use proptest::prelude::*;

fn label_vec() -> impl Strategy<Value = Vec<Label>> {
    prop::collection::vec(any::<bool>().prop_map(Label::from), 0..40)
}

fn paired_labels() -> impl Strategy<Value = (Vec<Label>, Vec<Label>)> {
    (0usize..40).prop_flat_map(|n| {
        (
            prop::collection::vec(any::<bool>().prop_map(Label::from), n),
            prop::collection::vec(any::<bool>().prop_map(Label::from), n),
        )
    })
}

fn invert(labels: &[Label]) -> Vec<Label> {
    labels.iter().map(|l| l.invert()).collect()
}

/// Patients whose label pattern exercises both classes of every criterion.
fn mixed_patients() -> Vec<(String, Labels)> {
    (0..4)
        .map(|i| {
            let mut labels = Labels::default();
            for criterion in Criterion::ALL {
                labels.set(criterion, Label::from((i + criterion.index()) % 2 == 0));
            }
            (format!("{}.xml", 100 + i), labels)
        })
        .collect()
}

fn borrowed(patients: &[(String, Labels)]) -> Vec<(&str, &Labels)> {
    patients.iter().map(|(id, l)| (id.as_str(), l)).collect()
}

proptest! {
    #[test]
    fn prop_rates_are_finite_and_bounded(truth in label_vec()) {
        let pred = invert(&truth);
        let counts = ConfusionCounts::from_labels(&truth, &pred).unwrap();
        for rate in [counts.ppv(), counts.tpr(), counts.tnr(), counts.npv(), counts.f1(), counts.accuracy()] {
            prop_assert!(rate.is_finite());
            prop_assert!((0.0..=1.0).contains(&rate));
        }
        prop_assert!(counts.mcc().is_finite());
        prop_assert!(counts.dor().is_finite());
    }

    #[test]
    fn prop_polarity_symmetry((truth, pred) in paired_labels()) {
        let met = ConfusionCounts::from_labels(&truth, &pred).unwrap();
        let not_met = ConfusionCounts::from_labels(&invert(&truth), &invert(&pred)).unwrap();

        prop_assert_eq!(not_met.true_pos, met.true_neg);
        prop_assert_eq!(not_met.true_neg, met.true_pos);
        prop_assert_eq!(not_met.false_pos, met.false_neg);
        prop_assert_eq!(not_met.false_neg, met.false_pos);
        prop_assert_eq!(not_met, met.invert());
    }

    #[test]
    fn prop_counts_cover_every_pair((truth, pred) in paired_labels()) {
        let counts = ConfusionCounts::from_labels(&truth, &pred).unwrap();
        prop_assert_eq!(counts.total(), truth.len());
    }
}

#[test]
fn test_identical_corpora_score_perfectly() {
    let patients = mixed_patients();
    let metrics = evaluate(&borrowed(&patients), &borrowed(&patients)).unwrap();

    assert_eq!(metrics.patients, 4);
    for criterion in Criterion::ALL {
        let m = metrics.criterion(criterion).unwrap();
        assert_eq!(m.met.f1, 1.0, "{} met F1", criterion);
        assert_eq!(m.not_met.f1, 1.0, "{} not met F1", criterion);
        assert_eq!(m.overall_f1, 1.0, "{} overall F1", criterion);
    }
    assert_eq!(metrics.micro.overall_f1, 1.0);
    assert_eq!(metrics.macro_avg.met.f1, 1.0);
    assert_eq!(metrics.macro_avg.overall_f1, 1.0);
}

#[test]
fn test_mismatched_patients_fail() {
    let gold = mixed_patients();
    let mut pred = mixed_patients();
    pred[2].0 = "999.xml".to_string();

    let result = evaluate(&borrowed(&gold), &borrowed(&pred));
    assert!(matches!(result, Err(EvalError::PatientMismatch(_))));
}

#[test]
fn test_report_table() {
    let gold = mixed_patients();
    let pred: Vec<(String, Labels)> = gold
        .iter()
        .map(|(id, labels)| {
            let mut labels = *labels;
            labels.set(Criterion::Abdominal, Label::Met);
            (id.clone(), labels)
        })
        .collect();

    let metrics = evaluate(&borrowed(&gold), &borrowed(&pred)).unwrap();
    let table = render_table(&metrics);

    let expected_head = concat!(
        "------------------------------------------------------------------------------------------------------------------\n",
        "     4 patients  ----------------- met ------------------  --------------- not met ----------------  -- overall --\n",
        "                   TP   TN   FP   FN    PPV    TPR     F1    TP   TN   FP   FN    PPV    TPR     F1             F1\n",
        "---------------  ----------------------------------------  ----------------------------------------  -------------\n",
        "      ABDOMINAL     2    0    2    0 0.5000 1.0000 0.6667     0    2    0    2 0.0000 0.0000 0.0000         0.3333\n",
        "   ADVANCED-CAD     2    2    0    0 1.0000 1.0000 1.0000     2    2    0    0 1.0000 1.0000 1.0000         1.0000\n",
    );
    assert!(table.starts_with(expected_head), "{}", table);

    let expected_tail = concat!(
        "---------------  ----------------------------------------  ----------------------------------------  -------------\n",
        " micro-averaged    26   24    2    0 0.9286 1.0000 0.9630    24   26    0    2 1.0000 0.9231 0.9600         0.9615\n",
        " macro-averaged                      0.9615 1.0000 0.9744                      0.9231 0.9231 0.9231         0.9487\n",
        "------------------------------------------------------------------------------------------------------------------\n",
    );
    assert!(table.ends_with(expected_tail), "{}", table);
}
