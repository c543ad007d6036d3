//! Baseline rule set: loose proximity patterns.
//!
//! Gaps are plain `.{0,20}` spans with no word boundaries, so terms may
//! match inside longer words ("prev" in "prevent").

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use super::cad::AdvancedCad;
use super::patterns::{any_match, negation_scan, unnegated_trigger};
use super::{CriterionMatcher, DrugGazetteer};
use crate::models::Criterion;

/// CREATININE values strictly above this are met.
pub const CREATININE_THRESHOLD: f64 = 1.5;

/// Closed HBA1C interval.
pub const HBA1C_RANGE: (f64, f64) = (6.5, 9.5);

pub(crate) const LANGUAGES: &str = "arabic|aramaic|armenian|bulgarian|burmese|cambodian|cantanese|cantonese|catonese|chinese|creole|croele|ethiopian|farsi|farsti|french|greek|gujarati|haitan|hindi|indonesian|infant|italian|japanese|korean|laotian|latvian|loatian|mandarin|nonenglish|persian|polish|portugese|portuguese|romanian|rusian|russian|somali|spainish|spanish|thai|tiawanese|urdu|vietmanese|vietnamese|yiddish";

const COUNTRIES: &str = "afghanistan|albania|algeria|andorra|angola|antigua|antigua and barbuda|argentina|armenia|australia|austria|azerbaijan|bahamas|bahrain|bangladesh|barbados|belarus|belgium|belize|benin|bhutan|bolivia|bosnia|bosnia and herzegovina|botswana|brazil|brunei|bulgaria|burkina|burkina faso|burundi|cabo verde|cape verde|cape vert|cambodia|cambodja|cameroon|canada|central african republic|chad|chile|china|colombia|comoros|congo|costa rica|croatia|cuba|cyprus|czechia|côte d'ivoire|ivory coast|korea|democratic republic of congo|republic of congo|denmark|djibouti|dominica|dominican republic|ecuador|egypt|el salvador|equatorial guinea|eritrea|estonia|ethiopia|faroe islands|fiji|finland|france|gabon|gambia|georgia|germany|ghana|greece|grenada|guatemala|guinea|guinea-bissau|guyana|haiti|honduras|hungary|iceland|india|indonesia|iran|iraq|ireland|israel|italy|jamaica|japan|jordan|kazakhstan|kenya|kiribati|kuwait|kyrgyzstan|laos|latvia|lebanon|lesotho|liberia|libya|lithuania|luxembourg|madagascar|malawi|malaysia|maldives|mali|malta|mauritania|mauritius|mexico|monaco|mongolia|montenegro|morocco|mozambique|myanmar|namibia|nauru|nepal|netherlands|new zealand|nicaragua|niger|nigeria|niue|norway|oman|pakistan|palau|panama|papua new guinea|papua|new guinea|paraguay|peru|philippines|poland|portugal|qatar|south korea|north korea|moldova|romania|russia|rwanda|st kitts|saint kitts|saint kitts and nevis|st lucia|saint lucia|st vincent|saint vincent|saint vincent and the grenadines|samoa|san marino|sao tome|saudi arabia|senegal|serbia|seychelles|sierra leone|singapore|slovakia|slovenia|solomon islands|somalia|south africa|south sudan|spain|sri lanka|sudan|suriname|swaziland|sweden|switzerland|syria|tajikistan|thailand|macedonia|timor|timor-leste|togo|tonga|trinidad|trinidad and tobago|tunisia|turkey|turkmenistan|tuvalu|uganda|ukraine|uae|united arab emirates|uk|united kingdom|tanzania|uruguay|uzbekistan|vanuatu|venezuela|vietnam|viet nam|yemen|zambia|zimbabwe";

lazy_static! {
    pub(crate) static ref CAD_NEGATION: Regex = Regex::new(
        r"(?i)\b(?:rule-out|rule out|ruled out|ruling out|r\\?o|no|not|negative|free|unlikely|any|absence|absent|father|mother|dad|mom|grandfather|grandmother|brother|sister|son|daughter|family|fh)\b"
    )
    .unwrap();

    static ref ALCOHOL_NEGATIVE: Vec<Regex> = vec![
        Regex::new(r"(?is)(?:deni|deny).{0,20}?(?:alcohol|drink|etoh)").unwrap(),
        Regex::new(r"(?is)(?:ago|no|past|prev|prior|history|h/o).{0,20}?(?:abuse|dependence|heavy).{0,20}?(?:alcohol|drink|etoh)").unwrap(),
        Regex::new(r"(?is)(?:ago|no|past|prev|prior|history|h/o).{0,20}?(?:alcohol|drink|etoh).{0,20}?(?:abuse|dependence|heavy)").unwrap(),
        Regex::new(r"(?is)(?:alcohol|drink|etoh).{0,20}?(?:ago|no|past|prev|prior|history|h/o).{0,20}?(?:abuse|dependence|heavy)").unwrap(),
        Regex::new(r"(?is)(?:abuse|dependence|heavy).{0,20}?(?:alcohol|drink|etoh).{0,20}?(?:ago|no|past|prev|prior|history|h/o)").unwrap(),
    ];

    static ref ALCOHOL_POSITIVE: Vec<Regex> = vec![
        Regex::new(r"(?is)limit.{0,20}?(?:alcohol|drink|etoh)").unwrap(),
        Regex::new(r"(?is)amount.{0,20}?(?:alcohol|etoh).{0,20}?drink").unwrap(),
        Regex::new(r"(?is)therapy.{0,20}?(?:alcohol|drink|etoh)").unwrap(),
        Regex::new(r"(?is)(?:alcohol|drink|etoh).{0,20}?(?:abuse|dependence|heavy)").unwrap(),
        Regex::new(r"(?is)(?:abuse|dependence|heavy).{0,20}?(?:alcohol|drink|etoh)").unwrap(),
    ];

    static ref ASPIRIN: Regex = Regex::new(
        r"(?i)(?P<left>.{0,40})\b(?:aspirin|asa|acetylsalicylic)\b(?P<right>.{0,40})"
    )
    .unwrap();

    static ref ASPIRIN_NEGATION: Regex =
        Regex::new(r"(?i)(?:avoid|stop|causes|rash|ulcer|allerg)").unwrap();

    static ref CREATININE_SHORT: Regex =
        Regex::new(r"(?is)cre?\.?(?:atinine)?(?:\s+of)?\s+(\d+\.\d+)").unwrap();

    static ref CREATININE_LONG: Regex =
        Regex::new(r"(?is)creatinine.{0,30}?(\d+\.\d+)").unwrap();

    pub(crate) static ref SUPPLEMENT: Regex = Regex::new(
        r"(?i)(?P<left>.{0,40})\b(?:calcium|copper|cyanocobalamin|epogen|ferrous gluconate|ferrous sulfate|fish oil|folate|k-dur|klor-con|minerals|nephrocaps|niferex|procrit|tocopherol|tums|ascorbic acid|folic acid|calcium|chromium|iron|magnesium|potassium|selenium|zinc|vitamin B[-\s]?1|vitamin B[-\s]?2|vitamin B[-\s]?6|vitamin B[-\s]?12|vitamin B[-\s]?100|vitamin C|vitamin E|vitamin G|vitamin H|vitamin M|vitamin suppl|mineral suppl|Betaxin|niacin|m\.?v\.?i\.?|thiamine)\b(?P<right>.{0,10})"
    )
    .unwrap();

    pub(crate) static ref SUPPLEMENT_LEFT_NEGATION: Regex = Regex::new(
        r"(?i)(?:elevated|high|low|normal|check|past|previous|was|recommend|counsel)"
    )
    .unwrap();

    /// Lab-value context: "iron 45", "potassium was low", "calcium channel".
    pub(crate) static ref SUPPLEMENT_RIGHT_NEGATION: Regex = Regex::new(
        r"(?i)(?:\s{3,}|\s*(?:is|was|were|of)?\s*\d+\.\d|\s*(?:is|was|were)|\s*(?:is|was)?[\s(]*(?:elevated|high|low|deficien|normal|channel|studies|study|stat|lab))"
    )
    .unwrap();

    static ref DRUG_ABUSE_POSITIVE: Vec<Regex> = vec![
        Regex::new(r"(?is)(?:ago|past|prev|prior|history|h/o).{0,20}?(?:cocaine|drug|heroin|illicit|substance).{0,20}?(?:abuse|dependence|heavy|smok|use)").unwrap(),
        Regex::new(r"(?is)(?:ago|past|prev|prior|history|h/o).{0,20}?(?:abuse|dependence|heavy|smok|use).{0,20}?(?:cocaine|drug|heroin|illicit|substance)").unwrap(),
        Regex::new(r"(?is)(?:abuse|dependence|heavy|smok|use).{0,20}?(?:cocaine|drug|heroin|illicit|substance).{0,20}?(?:ago|past|prev|prior|history|h/o)").unwrap(),
    ];

    pub(crate) static ref LANGUAGE_SPEAKING: Regex =
        Regex::new(&format!(r"(?is)(?:{})[\s-]+(?:speaking)", LANGUAGES)).unwrap();

    static ref FROM_COUNTRY: Regex = Regex::new(&format!(
        r"(?is)(?:male|woman|lady|patient|pt)\s+from\s+(?:the\s+)?(?:{})",
        COUNTRIES
    ))
    .unwrap();

    static ref HBA1C_VALUE: Regex = Regex::new(r"(?is)a1c.{0,30}?(\d+\.\d+)").unwrap();

    pub(crate) static ref KETO_NEGATIVE: Regex =
        Regex::new(r"(?is)no.{0,30}?(?:dka|ketones|ketoacidosis)").unwrap();

    pub(crate) static ref KETO_POSITIVE: Regex =
        Regex::new(r"(?is)(?:ketones\s+pos)|(?:ketoacidosis)").unwrap();

    static ref DECISION_NEGATIVE: Vec<Regex> = vec![
        Regex::new(r"(?is)(?:daughter|wife|husband|family|niece|father|mother|son|brother|sister|sibling).{0,20}?make.{0,20}?decision").unwrap(),
        Regex::new(r"(?is)(?:pt|patient).{0,20}?no.{0,20}?make.{0,20}?decision").unwrap(),
        Regex::new(r"(?is)mental.{0,20}?retardation").unwrap(),
        Regex::new(r"(?is)(?:confus|depress|altered|wors|bad).{0,20}?mental.{0,20}?status").unwrap(),
        Regex::new(r"(?is)(?:pt|patient).{0,20}?intubat").unwrap(),
    ];

    static ref MI: Regex = Regex::new(
        r"(?i)(?P<left>.{0,40})\b(?:myocardial infarction|MI|IMI|AMI|ASMI|HMI|NQWMI|NSTEMI|OASMI|SEMI|STEMI|TIMI)\b(?P<right>.{0,20})"
    )
    .unwrap();

    /// Negation plus past-event markers ("old", "s/p", "history").
    static ref MI_NEGATION: Regex = Regex::new(
        r"(?i)\b(?:rule-out|rule out|ruled out|ruling out|r\\?o|old|past|prior|post|s\\?p|s/?p|no|not|negative|free|unlikely|any|absence|absent|had|father|mother|dad|mom|grandfather|grandmother|brother|sister|son|daughter|family|fh|history)\b"
    )
    .unwrap();
}

/// Float captures of the first group.
fn captured_floats<'a>(pattern: &'a Regex, text: &'a str) -> impl Iterator<Item = f64> + 'a {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()))
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

pub struct AspForMi;

impl CriterionMatcher for AspForMi {
    fn criterion(&self) -> Criterion {
        Criterion::AspForMi
    }

    fn is_met(&self, document: &str) -> bool {
        unnegated_trigger(&ASPIRIN, &ASPIRIN_NEGATION, &ASPIRIN_NEGATION, document)
    }
}

/// Any "creatinine"/"cr" value above the threshold.
pub struct Creatinine {
    threshold: f64,
}

impl Creatinine {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn values(&self, document: &str) -> Vec<f64> {
        captured_floats(&CREATININE_SHORT, document)
            .chain(captured_floats(&CREATININE_LONG, document))
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
        self.values(document).iter().any(|v| *v > self.threshold)
    }
}

/// Supplement names outside lab-value context.
pub struct DietSupp2Mos;

impl CriterionMatcher for DietSupp2Mos {
    fn criterion(&self) -> Criterion {
        Criterion::DietSupp2Mos
    }

    fn is_met(&self, document: &str) -> bool {
        unnegated_trigger(
            &SUPPLEMENT,
            &SUPPLEMENT_LEFT_NEGATION,
            &SUPPLEMENT_RIGHT_NEGATION,
            document,
        )
    }
}

pub struct DrugAbuse;

impl CriterionMatcher for DrugAbuse {
    fn criterion(&self) -> Criterion {
        Criterion::DrugAbuse
    }

    fn is_met(&self, document: &str) -> bool {
        any_match(&DRUG_ABUSE_POSITIVE, document)
    }
}

/// Met unless the patient is described as speaking another language or
/// coming from another country.
pub struct English;

impl CriterionMatcher for English {
    fn criterion(&self) -> Criterion {
        Criterion::English
    }

    fn is_met(&self, document: &str) -> bool {
        !LANGUAGE_SPEAKING.is_match(document) && !FROM_COUNTRY.is_match(document)
    }
}

/// Any A1C value within the range.
pub struct Hba1c;

impl CriterionMatcher for Hba1c {
    fn criterion(&self) -> Criterion {
        Criterion::Hba1c
    }

    fn is_met(&self, document: &str) -> bool {
        let (low, high) = HBA1C_RANGE;
        captured_floats(&HBA1C_VALUE, document).any(|v| (low..=high).contains(&v))
    }
}

/// Shared by both rule sets.
pub struct Keto1Yr;

impl CriterionMatcher for Keto1Yr {
    fn criterion(&self) -> Criterion {
        Criterion::Keto1Yr
    }

    fn is_met(&self, document: &str) -> bool {
        !KETO_NEGATIVE.is_match(document) && KETO_POSITIVE.is_match(document)
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

/// The eleven baseline matchers.
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
