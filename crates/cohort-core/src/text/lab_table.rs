//! Lab-report table extraction.
//!
//! Clinical notes often paste lab panels verbatim, one test per line:
//!
//! ```text
//! Creatinine        1.6H    (0.6-1.5)   mg/dl
//! Plasma Sodium     139     (135-145)   mmol/L
//! ```
//!
//! Such rows are pulled out into a [`LabTable`] and removed from the
//! narrative so they do not pollute free-text matching.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{normalize_all, TextError, TextResult};

lazy_static! {
    static ref BLANKS: Regex = Regex::new(r"[ \u{a0}\t]+").unwrap();

    /// Name tokens, a value with an optional flag or unit letter, then a
    /// "low-high" reference range (optionally parenthesized).
    static ref ROW: Regex = Regex::new(
        r"(?i)\w+[ ]*[(]?\w*[ ]*\w*[)]?[ \t]+[<]?\d+(([ ]*[A-Za-z])|([.]?\d*[LH]?))[ \t]+[(]*\d+\.*\d*-\d+\.*\d*[)]*[ \t]+"
    )
    .unwrap();

    static ref KEY_END: Regex = Regex::new(r"[ \t]+[<]?\d+").unwrap();

    static ref VALUE: Regex = Regex::new(r"\b\d+[.]?\d*").unwrap();

    static ref RANGE: Regex = Regex::new(r"\d+[.]?\d*-\d+[.]?\d*").unwrap();
}

/// Test-name spellings folded to one canonical form, applied in order.
const NAME_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("Absolute", "Abs"),
    ("Isoenzymes", "Isoenz"),
    ("Carbon Dioxide", "CO2"),
    ("Bilirubin(Total)", "Total Bilirubin"),
    ("Bilirubin(Direct", "Direct Bilirubin"),
    ("Bilirubin(Direct)", "Direct Bilirubin"),
    (" (Stat Lab)", ""),
    ("Plasma ", ""),
    ("Blood Urea Nitro", "Urea Nitro"),
    ("UREA N", "Urea Nitro"),
    ("Neutrophils - Au", "Neutrophils"),
    ("Neutrophils - Ma", "Neutrophils"),
    ("Lymphocytes - Au", "Lymphocytes"),
    ("Lymphocytes - Ma", "Lymphocytes"),
    ("Monocytes - Manu", "Monocytes"),
    ("Monocytes - Auto", "Monocytes"),
    ("Eosinophils - Ma", "Eosinophils"),
    ("Eosinophils - Au", "Eosinophils"),
    ("Basophils - Manu", "Basophils"),
    ("Basophils - Auto", "Basophils"),
];

/// One lab result with its reference range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabValue {
    pub value: f64,
    pub low: f64,
    pub high: f64,
}

impl LabValue {
    /// Value strictly above the reference range.
    pub fn is_high(&self) -> bool {
        self.value > self.high
    }

    /// Value strictly below the reference range.
    pub fn is_low(&self) -> bool {
        self.value < self.low
    }
}

/// Test name → result, for one record. Later rows overwrite earlier ones.
pub type LabTable = BTreeMap<String, LabValue>;

/// Narrative and table split out of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// Non-table lines, each prefixed by a newline
    pub narrative: String,
    pub table: LabTable,
}

/// Splits records into narrative text and lab tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct LabTableExtractor;

fn parse_number(text: &str, line: &str) -> TextResult<f64> {
    text.parse::<f64>().map_err(|_| TextError::MalformedRow {
        line: line.to_string(),
        reason: format!("unparseable number {:?}", text),
    })
}

impl LabTableExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Whether a whitespace-collapsed line is a lab table row.
    pub fn is_table_row(&self, line: &str) -> bool {
        ROW.is_match(line)
    }

    /// Parse a table row into its canonical test name and result.
    pub fn parse_row(&self, line: &str) -> TextResult<(String, LabValue)> {
        let mut row = line.to_string();
        for (from, to) in NAME_SUBSTITUTIONS {
            row = row.replace(from, to);
        }

        let key = KEY_END.split(&row).next().unwrap_or_default().to_string();

        let value = VALUE.find(&row).ok_or_else(|| TextError::MalformedRow {
            line: line.to_string(),
            reason: "no value".into(),
        })?;
        let range = RANGE.find(&row).ok_or_else(|| TextError::MalformedRow {
            line: line.to_string(),
            reason: "no reference range".into(),
        })?;
        let (low, high) = range
            .as_str()
            .split_once('-')
            .ok_or_else(|| TextError::MalformedRow {
                line: line.to_string(),
                reason: "no reference range".into(),
            })?;

        Ok((
            key,
            LabValue {
                value: parse_number(value.as_str(), line)?,
                low: parse_number(low, line)?,
                high: parse_number(high, line)?,
            },
        ))
    }

    /// Split one record into raw narrative and lab table.
    pub fn extract_record(&self, raw_text: &str) -> TextResult<Extraction> {
        let mut narrative = String::new();
        let mut table = LabTable::new();

        for line in raw_text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let current = BLANKS.replace_all(trimmed, " ");
            if self.is_table_row(&current) {
                let (key, value) = self.parse_row(&current)?;
                table.insert(key, value);
            } else {
                narrative.push('\n');
                narrative.push_str(&current);
            }
        }

        Ok(Extraction { narrative, table })
    }

    /// Extract every record, then normalize all narratives as one batch.
    pub fn extract<S: AsRef<str>>(&self, raw_texts: &[S]) -> TextResult<Vec<Extraction>> {
        let raw: Vec<Extraction> = raw_texts
            .iter()
            .map(|t| self.extract_record(t.as_ref()))
            .collect::<TextResult<_>>()?;

        let narratives: Vec<&str> = raw.iter().map(|e| e.narrative.as_str()).collect();
        let cleaned = normalize_all(&narratives);

        Ok(raw
            .into_iter()
            .zip(cleaned)
            .map(|(e, narrative)| Extraction {
                narrative,
                table: e.table,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PANEL: &str = "Labs today:\n\
        \n\
        Plasma Sodium   139   (135-145) mmol/L\n\
        Creatinine 1.6H (0.6-1.5) mg/dl\n\
        Blood Urea Nitro 22 (8-25) mg/dl\n\
        Carbon Dioxide  25  (23-31) mmol/L\n\
        Continue current meds.";

    #[test]
    fn test_detects_rows() {
        let extractor = LabTableExtractor::new();
        assert!(extractor.is_table_row("Creatinine 1.6H (0.6-1.5) mg/dl"));
        assert!(extractor.is_table_row("Glucose 180 H (70-110) mg/dl"));
        assert!(extractor.is_table_row("Sodium 139 (135-145) mmol/L"));
        assert!(!extractor.is_table_row("Continue current meds."));
        // The range must be followed by more text
        assert!(!extractor.is_table_row("Creatinine 1.6 (0.6-1.5)"));
    }

    #[test]
    fn test_extract_record() {
        let extractor = LabTableExtractor::new();
        let extraction = extractor.extract_record(PANEL).unwrap();

        assert_eq!(extraction.narrative, "\nLabs today:\nContinue current meds.");
        assert_eq!(extraction.table.len(), 4);

        let creatinine = extraction.table["Creatinine"];
        assert_eq!(creatinine.value, 1.6);
        assert_eq!(creatinine.low, 0.6);
        assert_eq!(creatinine.high, 1.5);
        assert!(creatinine.is_high());

        assert_eq!(extraction.table["Sodium"].value, 139.0);
        assert_eq!(extraction.table["Urea Nitro"].value, 22.0);
    }

    #[test]
    fn test_value_skips_digits_inside_names() {
        let extractor = LabTableExtractor::new();
        let (key, value) = extractor.parse_row("CO2 25 (23-31) mmol/L").unwrap();
        assert_eq!(key, "CO2");
        assert_eq!(value.value, 25.0);
        assert_eq!(value.low, 23.0);
        assert_eq!(value.high, 31.0);
    }

    #[test]
    fn test_no_break_spaces_are_blanks() {
        let extractor = LabTableExtractor::new();
        let line = "Plasma\u{a0}Sodium\u{a0}\u{a0}139\u{a0}(135-145)\u{a0}mmol/L";
        assert!(!extractor.is_table_row(line));

        let extraction = extractor.extract_record(line).unwrap();
        assert_eq!(extraction.narrative, "");
        assert_eq!(extraction.table["Sodium"].value, 139.0);
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let extractor = LabTableExtractor::new();
        let text = "Glucose 180 H (70-110) mg/dl\nGlucose 95 (70-110) mg/dl";
        let extraction = extractor.extract_record(text).unwrap();
        assert_eq!(extraction.table["Glucose"].value, 95.0);
    }

    #[test]
    fn test_malformed_row_fails() {
        let extractor = LabTableExtractor::new();
        // Recognized as a row, but "4..-5" has no low-high pair
        let result = extractor.extract_record("Potassium 4 (4..-5) mmol/L");
        assert!(matches!(result, Err(TextError::MalformedRow { .. })));
    }

    #[test]
    fn test_batch_normalizes_narratives() {
        let extractor = LabTableExtractor::new();
        let extractions = extractor.extract(&[PANEL, "Pt denies chest pain."]).unwrap();

        assert_eq!(extractions.len(), 2);
        assert_eq!(extractions[0].narrative, "labs today continue current meds");
        assert_eq!(extractions[1].narrative, "patient denies chest pain");
        assert!(extractions[1].table.is_empty());
    }
}
