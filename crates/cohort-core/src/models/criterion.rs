//! Cohort selection criteria.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unknown criterion name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown criterion: {0}")]
pub struct UnknownCriterion(pub String);

/// One of the 13 fixed eligibility criteria.
///
/// Variants are declared in alphabetical order of their canonical names,
/// which is also the order used for label vectors and report rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Criterion {
    #[serde(rename = "ABDOMINAL")]
    Abdominal,
    #[serde(rename = "ADVANCED-CAD")]
    AdvancedCad,
    #[serde(rename = "ALCOHOL-ABUSE")]
    AlcoholAbuse,
    #[serde(rename = "ASP-FOR-MI")]
    AspForMi,
    #[serde(rename = "CREATININE")]
    Creatinine,
    #[serde(rename = "DIETSUPP-2MOS")]
    DietSupp2Mos,
    #[serde(rename = "DRUG-ABUSE")]
    DrugAbuse,
    #[serde(rename = "ENGLISH")]
    English,
    #[serde(rename = "HBA1C")]
    Hba1c,
    #[serde(rename = "KETO-1YR")]
    Keto1Yr,
    #[serde(rename = "MAJOR-DIABETES")]
    MajorDiabetes,
    #[serde(rename = "MAKES-DECISIONS")]
    MakesDecisions,
    #[serde(rename = "MI-6MOS")]
    Mi6Mos,
}

impl Criterion {
    /// Number of criteria.
    pub const COUNT: usize = 13;

    /// All criteria in canonical order.
    pub const ALL: [Criterion; Criterion::COUNT] = [
        Criterion::Abdominal,
        Criterion::AdvancedCad,
        Criterion::AlcoholAbuse,
        Criterion::AspForMi,
        Criterion::Creatinine,
        Criterion::DietSupp2Mos,
        Criterion::DrugAbuse,
        Criterion::English,
        Criterion::Hba1c,
        Criterion::Keto1Yr,
        Criterion::MajorDiabetes,
        Criterion::MakesDecisions,
        Criterion::Mi6Mos,
    ];

    /// Canonical upper-case name, as used in the corpus tags.
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Abdominal => "ABDOMINAL",
            Criterion::AdvancedCad => "ADVANCED-CAD",
            Criterion::AlcoholAbuse => "ALCOHOL-ABUSE",
            Criterion::AspForMi => "ASP-FOR-MI",
            Criterion::Creatinine => "CREATININE",
            Criterion::DietSupp2Mos => "DIETSUPP-2MOS",
            Criterion::DrugAbuse => "DRUG-ABUSE",
            Criterion::English => "ENGLISH",
            Criterion::Hba1c => "HBA1C",
            Criterion::Keto1Yr => "KETO-1YR",
            Criterion::MajorDiabetes => "MAJOR-DIABETES",
            Criterion::MakesDecisions => "MAKES-DECISIONS",
            Criterion::Mi6Mos => "MI-6MOS",
        }
    }

    /// Position in [`Criterion::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Recency window in months: only records at most this many months
    /// older than the most recent record are considered.
    ///
    /// `None` means the whole record history.
    pub fn months(&self) -> Option<u32> {
        match self {
            Criterion::Keto1Yr => Some(12),
            Criterion::Mi6Mos => Some(6),
            _ => None,
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = UnknownCriterion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Criterion::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCriterion(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for criterion in Criterion::ALL {
            assert_eq!(criterion.as_str().parse::<Criterion>(), Ok(criterion));
        }
    }

    #[test]
    fn test_unknown_name() {
        assert!("HEART-ATTACK".parse::<Criterion>().is_err());
        // Names are case-sensitive, like the corpus tags
        assert!("english".parse::<Criterion>().is_err());
    }

    #[test]
    fn test_index_matches_order() {
        for (i, criterion) in Criterion::ALL.iter().enumerate() {
            assert_eq!(criterion.index(), i);
        }
    }

    #[test]
    fn test_recency_windows() {
        assert_eq!(Criterion::Keto1Yr.months(), Some(12));
        assert_eq!(Criterion::Mi6Mos.months(), Some(6));
        assert_eq!(Criterion::Creatinine.months(), None);
    }

    #[test]
    fn test_serde_uses_canonical_name() {
        let json = serde_json::to_string(&Criterion::DietSupp2Mos).unwrap();
        assert_eq!(json, "\"DIETSUPP-2MOS\"");
    }
}
