//! Improved rule set.
//!
//! Differences from [`super::baseline`]:
//! - terms are word-bounded and gaps stop at sentence punctuation
//! - ALCOHOL-ABUSE and DRUG-ABUSE carry broader vocabularies and denial patterns
//! - CREATININE and HBA1C drop HTML entities and dates before reading numbers
//! - HBA1C uses the last reported value, including values in lab tables
//! - ENGLISH looks for interpreters instead of countries of origin
//! - MAKES-DECISIONS adds dementia and communication patterns

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use super::baseline::{DietSupp2Mos, Keto1Yr, HBA1C_RANGE, LANGUAGE_SPEAKING};
use super::cad::AdvancedCad;
use super::patterns::{
    any_match, char_prefix, clean_lines, negation_scan, remove_dates, remove_html_chars,
    squash_whitespace, unnegated_trigger,
};
use super::{CriterionMatcher, DrugGazetteer};
use crate::models::Criterion;

/// CREATININE values strictly above this are met.
pub const CREATININE_THRESHOLD: f64 = 1.4;

/// Characters scanned after an A1C trigger.
const HBA1C_WINDOW: usize = 50;

lazy_static! {
    static ref CAD_NEGATION: Regex = Regex::new(
        r"(?i)\b(?:rule-out|rule out|ruled out|ruling out|r\\?o|r/o|no|not|negative|free|unlikely|any|absence|absent|father|mother|dad|mom|grandfather|grandmother|brother|sister|son|daughter|family|fh)\b"
    )
    .unwrap();

    static ref ALCOHOL_NEGATIVE: Vec<Regex> = vec![
        Regex::new(r"(?is)\b(?:denies|deny)\b[^.,]{0,20}?\b(?:alcohol|drink|drinking|etoh)\b").unwrap(),
        Regex::new(r"(?is)\b(?:ago|no|none|past|prev|previous|prior|history|h/o|hx)\b[^.,]{0,20}?\b(?:abuse|dependence|heavy|ingestion)\b[^.,]{0,20}?\b(?:alcohol|drink|drinking|etoh)\b").unwrap(),
        Regex::new(r"(?is)\b(?:ago|no|none|past|prev|previous|prior|history|h/o|hx)\b[^.,]{0,20}?\b(?:alcohol|drink|drinking|etoh)\b[^.,]{0,20}?\b(?:abuse|dependence|heavy|ingestion)\b").unwrap(),
        Regex::new(r"(?is)\b(?:alcohol|drink|drinking|etoh)\b[^.,]{0,20}?\b(?:ago|no|none|past|prev|previous|prior|history|h/o|hx)\b[^.,]{0,20}?\b(?:abuse|dependence|heavy|ingestion)\b").unwrap(),
        Regex::new(r"(?is)\b(?:abuse|binge|dependence|heavy|ingestion)\b[^.,]{0,20}?\b(?:alcohol|drink|drinking|etoh)\b[^.,]{0,20}?\b(?:ago|no|none|past|prev|previous|prior|history|h/o|hx)\b").unwrap(),
    ];

    static ref ALCOHOL_POSITIVE: Vec<Regex> = vec![
        Regex::new(r"(?is)\blimit\b[^.,]{0,20}?\b(?:alcohol|drink|drinking|etoh)\b").unwrap(),
        Regex::new(r"(?is)\bamount\b[^.,]{0,20}?\b(?:alcohol|etoh)\b[^.,]{0,20}?\b(?:drink|drinking)\b").unwrap(),
        Regex::new(r"(?is)\btherapy\b[^.,]{0,20}?\b(?:alcohol|drink|drinking|etoh)\b").unwrap(),
        Regex::new(r"(?is)\b(?:alcohol|drink|drinking|etoh)\b[^.,]{0,20}?\b(?:abuse|dependence|heavy|ingestion)\b").unwrap(),
        Regex::new(r"(?is)\b(?:abuse|binge|dependence|heavy|ingestion)\b[^.,]{0,20}?\b(?:alcohol|drink|drinking|etoh)\b").unwrap(),
    ];

    static ref ASA_PHYSICAL_STATUS: Regex = Regex::new(r"(?i)asa physical status").unwrap();

    static ref ASPIRIN: Regex = Regex::new(
        r"(?is)(?P<left>.{0,40})\b(?:aspirin|asa|acetylsalicylic)\b(?P<right>.{0,40})"
    )
    .unwrap();

    static ref ASPIRIN_NEGATION: Regex = Regex::new(
        r"(?is)(?:avoid|stop|causes|rash|ulcer|allerg|consider|other\sday|none|should)"
    )
    .unwrap();

    static ref CREATININE_MENTION: Regex = Regex::new(
        r"(?i)\b(?:creatinine was elevated to|creatinine stable|creatinine \(stat lab\)|cr|cr\.|cre|creatinine)[\s:](?P<value>[^,;]{1,10})"
    )
    .unwrap();

    static ref CREATININE_NUMBER: Regex = Regex::new(r"\b\d\.\d{1,2}\b").unwrap();

    static ref ELEVATED_CREATININE: Regex = Regex::new(
        r"(?i)(?:elevated|rising serum)\b[^.,;:]{1,20}\bcreatinine\b"
    )
    .unwrap();

    static ref DRUG_ABUSE_NEGATIVE: Vec<Regex> = vec![
        Regex::new(r"(?i)\b(?:denies|deny|no)\b[^.,;:\n]{0,25}\b(?:ago|past|prev|previous|previously|prior|history|h/o|hx|h/x)\b[^.,;:\n]{0,25}\b(?:crack|cocaine|drug|heroin|illicit|substance)\b[^.,;:\n]{0,25}\b(?:abuse|abused|dependence|heavy|smoke|smoked|smoking|use|used)\b").unwrap(),
        Regex::new(r"(?i)\b(?:denies|deny|no)\b[^.,;:\n]{0,25}\b(?:ago|past|prev|previous|previously|prior|history|h/o|hx|h/x)\b[^.,;:\n]{0,25}\b(?:abuse|abused|dependence|heavy|smoke|smoked|smoking|use|used)\b[^.,;:\n]{0,25}\b(?:crack|cocaine|drug|heroin|illicit|substance)\b").unwrap(),
    ];

    static ref DRUG_ABUSE_POSITIVE: Vec<Regex> = vec![
        Regex::new(r"(?i)\b(?:ago|past|prev|previous|previously|prior|history|h/o|hx|h/x)\b[^.,;:\n]{0,25}\b(?:crack|cocaine|drug|heroin|illicit|substance)\b[^.,;:\n]{0,25}\b(?:abuse|abused|dependence|heavy|smoke|smoked|smoking|use|used)\b").unwrap(),
        Regex::new(r"(?i)\b(?:ago|past|prev|previous|previously|prior|history|h/o|hx|h/x)\b[^.,;:\n]{0,25}\b(?:abuse|abused|dependence|heavy|smoke|smoked|smoking|use|used)\b[^.,;:\n]{0,25}\b(?:crack|cocaine|drug|heroin|illicit|substance)\b").unwrap(),
        Regex::new(r"(?i)\b(?:abuse|abused|dependence|heavy|smoke|smoked|smoking|use|used)\b[^.,;:\n]{0,25}\b(?:crack|cocaine|drug|heroin|illicit|substance)\b[^.,;:\n]{0,25}\b(?:ago|past|prev|previous|previously|prior|history|h/o|hx|h/x)\b").unwrap(),
    ];

    static ref INTERPRETER: Vec<Regex> = vec![
        Regex::new(r"(?is)\b(?:member|members|family)\b[^.,;]{0,20}\b(?:interpret|translate|interpreting|translating)\b").unwrap(),
        Regex::new(r"(?is)\b(?:interpreter|translator)\b[^.,;]{0,20}\b(?:present|required|necessary)\b").unwrap(),
    ];

    /// A lab-table header whose next line holds the value.
    static ref HBA1C_HEADER: Regex =
        Regex::new(r"(?i)^date.+(?:a1c|hgbaic|hbaic|hgaic)").unwrap();

    static ref HBA1C_TRIGGER: Regex = Regex::new(r"(?i)a1c|hgbaic|hbaic|hgaic").unwrap();

    static ref HBA1C_NUMBER: Regex = Regex::new(r"\d{1,2}(?:\.\d{1,2})?").unwrap();

    static ref DECISION_NEGATIVE: Vec<Regex> = vec![
        Regex::new(r"(?is)\b(?:daughter|wife|husband|family|niece|father|mother|son|brother|sister|sibling)\b[^.,;]{0,20}(?:make|makes)\b[^.,;]{0,20}\b(?:decision|decisions)\b").unwrap(),
        Regex::new(r"(?is)\b(?:pt|patient)\b[^.,;]{0,20}\bnot\b[^.,;]{0,20}\b(?:make|makes)\b[^.,;]{0,20}\b(?:decision|decisions)\b").unwrap(),
        Regex::new(r"(?is)\bmental\b[^.,;]{0,20}\bretardation\b").unwrap(),
        Regex::new(r"(?is)\b(?:confusion|confused|depression|depressed|worst|worse|bad)\b[^.,;]{0,20}\bmental[^.,;]{0,20}\bstatus\b").unwrap(),
        Regex::new(r"(?is)\b(?:consult|appointment)\b[^.,;]{0,20}\b(?:neuro|psych|psychiatric)[^.,;]{0,20}\b(?:dementia|alzheimer)\b").unwrap(),
        Regex::new(r"(?is)\b(?:pt|patient)\b[^.,;]{0,20}\b(?:diagnosed|dx)[^.,;]{0,20}\b(?:dementia|alzheimer)\b").unwrap(),
        Regex::new(r"(?is)\bsevere\b[^.,;]{0,20}\b(?:dementia|alzheimer)\b").unwrap(),
        Regex::new(r"(?is)\b(?:unable|not able)\b[^.,;]{0,20}\banswer\b[^.,;]{0,20}\b(?:question|questions)\b").unwrap(),
        Regex::new(r"(?is)\b(?:pt|patient)\b[^.,;]{0,20}\bnot\b[^.,;]{0,20}\b[^.,;]{0,20}\b(?:acting|speaking|communicating)\b[^.,;]{0,20}\b(?:himself|herself|self)\b").unwrap(),
    ];

    static ref MI: Regex = Regex::new(
        r"(?is)(?P<left>.{0,40})\b(?:myocardial infarction|MI|IMI|AMI|ASMI|HMI|NQWMI|NSTEMI|OASMI|SEMI|STEMI|TIMI)\b(?P<right>.{0,20})"
    )
    .unwrap();

    /// Past-event markers include "history"/"hx" with up to two prefix
    /// letters ("phx", "pmhx") and "flow" for flow-sheet headers.
    static ref MI_NEGATION: Regex = Regex::new(
        r"(?is)\b(?:rule-out|rule out|ruled out|ruling out|r\\?o|r/o|old|past|prior|post|s\\?p|s/p|no|not|negative|free|unlikely|any|absence|absent|had|father|mother|dad|mom|grandfather|grandmother|brother|sister|son|daughter|family|fh|\w{0,2}story|\w{0,2}hx|flow)\b"
    )
    .unwrap();
}

pub struct AlcoholAbuse;

impl CriterionMatcher for AlcoholAbuse {
    fn criterion(&self) -> Criterion {
        Criterion::AlcoholAbuse
    }

    fn is_met(&self, document: &str) -> bool {
        negation_scan(&ALCOHOL_NEGATIVE, &ALCOHOL_POSITIVE, document)
    }
}

/// Anesthesia "ASA physical status" scores are not aspirin.
pub struct AspForMi;

impl CriterionMatcher for AspForMi {
    fn criterion(&self) -> Criterion {
        Criterion::AspForMi
    }

    fn is_met(&self, document: &str) -> bool {
        let text = ASA_PHYSICAL_STATUS.replace_all(document, "");
        unnegated_trigger(&ASPIRIN, &ASPIRIN_NEGATION, &ASPIRIN_NEGATION, &text)
    }
}

pub struct Creatinine {
    threshold: f64,
}

impl Creatinine {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// First number after each creatinine mention, dates removed.
    pub fn values(&self, document: &str) -> Vec<f64> {
        let text = prepare_numeric(document);
        CREATININE_MENTION
            .captures_iter(&text)
            .filter_map(|caps| {
                let value = caps.name("value")?;
                CREATININE_NUMBER.find(value.as_str())?.as_str().parse::<f64>().ok()
            })
            .collect()
    }
}

impl Default for Creatinine {
    fn default() -> Self {
        Self::new(CREATININE_THRESHOLD)
    }
}

impl CriterionMatcher for Creatinine {
    fn criterion(&self) -> Criterion {
        Criterion::Creatinine
    }

    fn is_met(&self, document: &str) -> bool {
        if self.values(document).iter().any(|v| *v > self.threshold) {
            return true;
        }
        ELEVATED_CREATININE.is_match(&prepare_numeric(document))
    }
}

fn prepare_numeric(document: &str) -> String {
    squash_whitespace(&remove_dates(&remove_html_chars(document)))
}

pub struct DrugAbuse;

impl CriterionMatcher for DrugAbuse {
    fn criterion(&self) -> Criterion {
        Criterion::DrugAbuse
    }

    fn is_met(&self, document: &str) -> bool {
        negation_scan(&DRUG_ABUSE_NEGATIVE, &DRUG_ABUSE_POSITIVE, document)
    }
}

pub struct English;

impl CriterionMatcher for English {
    fn criterion(&self) -> Criterion {
        Criterion::English
    }

    fn is_met(&self, document: &str) -> bool {
        !LANGUAGE_SPEAKING.is_match(document) && !any_match(&INTERPRETER, document)
    }
}

/// Last reported A1C value within the range.
pub struct Hba1c;

impl Hba1c {
    /// Reported values in document order.
    ///
    /// A header line ("Date ... HbA1c") contributes the first number of
    /// the line below it. Otherwise every trigger contributes the first
    /// number in the text after it, up to the next trigger, 50 characters,
    /// or the first comma or semicolon.
    pub fn values(&self, document: &str) -> Vec<f64> {
        let text = remove_dates(&remove_html_chars(document));
        let mut values = Vec::new();
        let mut after_header = false;

        for line in clean_lines(&text) {
            if after_header {
                after_header = false;
                values.extend(first_number(&line));
                continue;
            }
            if HBA1C_HEADER.is_match(&line) {
                after_header = true;
                continue;
            }

            let triggers: Vec<_> = HBA1C_TRIGGER.find_iter(&line).collect();
            for (i, trigger) in triggers.iter().enumerate() {
                let end = triggers.get(i + 1).map_or(line.len(), |next| next.start());
                let window = char_prefix(&line[trigger.end()..end], HBA1C_WINDOW);
                let window = window.split(|c| c == ';' || c == ',').next().unwrap_or_default();
                values.extend(first_number(window));
            }
        }

        values
    }
}

fn first_number(text: &str) -> Option<f64> {
    HBA1C_NUMBER.find(text)?.as_str().parse::<f64>().ok()
}

impl CriterionMatcher for Hba1c {
    fn criterion(&self) -> Criterion {
        Criterion::Hba1c
    }

    fn is_met(&self, document: &str) -> bool {
        let (low, high) = HBA1C_RANGE;
        self.values(document)
            .last()
            .is_some_and(|v| (low..=high).contains(v))
    }
}

pub struct MakesDecisions;

impl CriterionMatcher for MakesDecisions {
    fn criterion(&self) -> Criterion {
        Criterion::MakesDecisions
    }

    fn is_met(&self, document: &str) -> bool {
        !any_match(&DECISION_NEGATIVE, document)
    }
}

pub struct Mi6Mos;

impl CriterionMatcher for Mi6Mos {
    fn criterion(&self) -> Criterion {
        Criterion::Mi6Mos
    }

    fn is_met(&self, document: &str) -> bool {
        unnegated_trigger(&MI, &MI_NEGATION, &MI_NEGATION, document)
    }
}

/// The eleven improved matchers. DIETSUPP-2MOS and KETO-1YR are shared
/// with the baseline.
pub fn matchers(gazetteer: Arc<DrugGazetteer>) -> Vec<Box<dyn CriterionMatcher>> {
    vec![
        Box::new(AdvancedCad::new(gazetteer, &CAD_NEGATION)),
        Box::new(AlcoholAbuse),
        Box::new(AspForMi),
        Box::new(Creatinine::default()),
        Box::new(DietSupp2Mos),
        Box::new(DrugAbuse),
        Box::new(English),
        Box::new(Hba1c),
        Box::new(Keto1Yr),
        Box::new(MakesDecisions),
        Box::new(Mi6Mos),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alcohol() {
        assert!(!AlcoholAbuse.is_met("Patient denies alcohol abuse"));
        assert!(AlcoholAbuse.is_met("Limit alcohol intake recommended"));
        assert!(AlcoholAbuse.is_met("Episodes of binge drinking on weekends"));
        assert!(!AlcoholAbuse.is_met("No history of alcohol abuse"));
        // Word boundaries: "prevent" is not "prev"
        assert!(AlcoholAbuse.is_met("Counseled to prevent alcohol abuse"));
    }

    #[test]
    fn test_aspirin() {
        assert!(AspForMi.is_met("Continue aspirin 81 mg daily."));
        assert!(!AspForMi.is_met("ASA physical status 2. Anesthesia uneventful."));
        assert!(!AspForMi.is_met("Should consider aspirin"));
    }

    #[test]
    fn test_creatinine() {
        let matcher = Creatinine::default();
        assert!(matcher.is_met("Creatinine 1.6"));
        assert!(!matcher.is_met("Creatinine 1.2"));
        assert!(matcher.is_met("Cr: 1.45 this morning"));
        assert!(matcher.is_met("Noted elevated serum creatinine"));
        assert_eq!(matcher.values("Cr 1.8 on 3/14/2019, cre 0.9"), vec![1.8, 0.9]);
    }

    #[test]
    fn test_creatinine_ignores_dates() {
        let matcher = Creatinine::default();
        // The date fills the whole value window unless removed
        assert!(matcher.is_met("Cr 10/2/2019 1.6"));
        assert!(!matcher.is_met("Cr 10/2/2019 1.1"));
    }

    #[test]
    fn test_drug_abuse() {
        assert!(DrugAbuse.is_met("History of cocaine abuse"));
        assert!(DrugAbuse.is_met("Used crack in the past"));
        assert!(!DrugAbuse.is_met("Denies any history of illicit drug use"));
        assert!(!DrugAbuse.is_met("Cocaine. Abuse screening past due"));
    }

    #[test]
    fn test_english() {
        assert!(English.is_met("65 yo male from the Dominican Republic"));
        assert!(!English.is_met("Mandarin speaking, son present"));
        assert!(!English.is_met("Family member to interpret at visits"));
        assert!(!English.is_met("Interpreter is required"));
    }

    #[test]
    fn test_hba1c_last_value() {
        assert!(!Hba1c.is_met("A1C 7.0\nFollow up.\nA1C 10.0"));
        assert!(Hba1c.is_met("A1C 10.0\nFollow up.\nA1C 7.0"));
        assert!(!Hba1c.is_met("A1C 7.0 improving, repeat A1C 10.0"));
        assert!(!Hba1c.is_met("No labs"));
    }

    #[test]
    fn test_hba1c_header_line() {
        let doc = "Date    HgbA1c\n   7.9";
        assert_eq!(Hba1c.values(doc), vec![7.9]);
        assert!(Hba1c.is_met(doc));
    }

    #[test]
    fn test_hba1c_window_stops_at_comma() {
        assert_eq!(Hba1c.values("a1c pending, glucose 180"), Vec::<f64>::new());
        assert_eq!(Hba1c.values("hgbaic was 8.2; next 6.0"), vec![8.2]);
    }

    #[test]
    fn test_makes_decisions() {
        assert!(MakesDecisions.is_met("Alert and oriented, answers questions"));
        assert!(!MakesDecisions.is_met("Pt with severe dementia"));
        assert!(!MakesDecisions.is_met("Patient unable to answer questions"));
        assert!(!MakesDecisions.is_met("Wife makes medical decisions"));
    }

    #[test]
    fn test_mi() {
        assert!(Mi6Mos.is_met("Admitted with acute NSTEMI last week"));
        assert!(!Mi6Mos.is_met("PMHx: MI 2010"));
        assert!(!Mi6Mos.is_met("r/o MI overnight"));
    }
}
