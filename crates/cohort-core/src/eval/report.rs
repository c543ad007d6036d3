//! Fixed-width text report.

use super::{Metrics, PolarityMetrics, RateMetrics};
use crate::models::Criterion;

const RULE: &str = "------------------------------------------------------------------------------------------------------------------\n";
const SEPARATOR: &str = "---------------  ----------------------------------------  ----------------------------------------  -------------\n";
const COLUMNS: &str = "                   TP   TN   FP   FN    PPV    TPR     F1    TP   TN   FP   FN    PPV    TPR     F1             F1\n";

/// Blank space standing in for the four count columns.
const NO_COUNTS: &str = "                      ";

fn polarity_cells(m: &PolarityMetrics) -> String {
    format!(
        "{:4} {:4} {:4} {:4} {:6.4} {:6.4} {:6.4}",
        m.counts.true_pos, m.counts.true_neg, m.counts.false_pos, m.counts.false_neg, m.ppv, m.tpr, m.f1
    )
}

fn rate_cells(m: &RateMetrics) -> String {
    format!("{:6.4} {:6.4} {:6.4}", m.ppv, m.tpr, m.f1)
}

fn count_row(name: &str, met: &PolarityMetrics, not_met: &PolarityMetrics, overall: f64) -> String {
    format!(
        "{:>15}  {}  {}         {:6.4}\n",
        name,
        polarity_cells(met),
        polarity_cells(not_met),
        overall
    )
}

/// Render metrics as the fixed-width table of the n2c2 track 1 scorer.
///
/// Criteria missing from `metrics` are rendered with zero counts.
pub fn render_table(metrics: &Metrics) -> String {
    let mut table = String::new();

    table.push_str(RULE);
    table.push_str(&format!(
        "{:6} patients  ----------------- met ------------------  --------------- not met ----------------  -- overall --\n",
        metrics.patients
    ));
    table.push_str(COLUMNS);
    table.push_str(SEPARATOR);

    for criterion in Criterion::ALL {
        let row = metrics.criterion(criterion).copied().unwrap_or_else(|| {
            super::CriterionMetrics::from_counts(super::ConfusionCounts::default())
        });
        table.push_str(&count_row(criterion.as_str(), &row.met, &row.not_met, row.overall_f1));
    }

    table.push_str(SEPARATOR);
    let micro = &metrics.micro;
    table.push_str(&count_row("micro-averaged", &micro.met, &micro.not_met, micro.overall_f1));

    let macro_avg = &metrics.macro_avg;
    table.push_str(&format!(
        "{:>15}{}{}{}{}         {:6.4}\n",
        "macro-averaged",
        NO_COUNTS,
        rate_cells(&macro_avg.met),
        NO_COUNTS,
        rate_cells(&macro_avg.not_met),
        macro_avg.overall_f1
    ));
    table.push_str(RULE);

    table
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::eval::ConfusionCounts;

    #[test]
    fn test_line_widths() {
        let mut counts = BTreeMap::new();
        for criterion in Criterion::ALL {
            counts.insert(
                criterion,
                ConfusionCounts {
                    true_pos: 3,
                    true_neg: 4,
                    false_pos: 1,
                    false_neg: 2,
                },
            );
        }
        let table = render_table(&Metrics::from_counts(10, &counts));
        let lines: Vec<&str> = table.lines().collect();

        // rule, title, columns, separator, 13 rows, separator, micro, macro, rule
        assert_eq!(lines.len(), 21);
        assert!(lines.iter().all(|l| l.len() == 114), "{:#?}", lines);
        assert!(table.ends_with('\n'));
    }

    #[test]
    fn test_row_format() {
        let mut counts = BTreeMap::new();
        counts.insert(
            Criterion::Hba1c,
            ConfusionCounts {
                true_pos: 3,
                true_neg: 4,
                false_pos: 1,
                false_neg: 2,
            },
        );
        let table = render_table(&Metrics::from_counts(10, &counts));

        assert!(table.contains(
            "          HBA1C     3    4    1    2 0.7500 0.6000 0.6667     4    3    2    1 0.6667 0.8000 0.7273         0.6970\n"
        ));
        assert!(table.contains("\n    10 patients  --"));
        assert!(table.contains(
            "      ABDOMINAL     0    0    0    0 0.0000 0.0000 0.0000     0    0    0    0 0.0000 0.0000 0.0000         0.0000\n"
        ));
    }
}
