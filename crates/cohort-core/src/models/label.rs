//! Criterion labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Criterion;

/// Label errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LabelError {
    #[error("Invalid label value: {0}")]
    InvalidValue(String),

    #[error("Expected {expected} labels, got {actual}")]
    WrongCount { expected: usize, actual: usize },
}

pub type LabelResult<T> = Result<T, LabelError>;

/// Binary decision for one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Label {
    #[default]
    #[serde(rename = "not met")]
    NotMet,
    #[serde(rename = "met")]
    Met,
}

impl Label {
    /// Text form used in the corpus `met` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::NotMet => "not met",
            Label::Met => "met",
        }
    }

    /// Integer form (0 or 1).
    pub fn as_u8(&self) -> u8 {
        match self {
            Label::NotMet => 0,
            Label::Met => 1,
        }
    }

    /// The opposite polarity.
    pub fn invert(&self) -> Label {
        match self {
            Label::NotMet => Label::Met,
            Label::Met => Label::NotMet,
        }
    }

    pub fn is_met(&self) -> bool {
        matches!(self, Label::Met)
    }
}

impl From<bool> for Label {
    fn from(met: bool) -> Self {
        if met {
            Label::Met
        } else {
            Label::NotMet
        }
    }
}

impl TryFrom<i64> for Label {
    type Error = LabelError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::NotMet),
            1 => Ok(Label::Met),
            other => Err(LabelError::InvalidValue(other.to_string())),
        }
    }
}

impl FromStr for Label {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not met" => Ok(Label::NotMet),
            "met" => Ok(Label::Met),
            other => Err(LabelError::InvalidValue(other.to_string())),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One label per criterion for a single patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Labels([Label; Criterion::COUNT]);

impl Labels {
    pub fn get(&self, criterion: Criterion) -> Label {
        self.0[criterion.index()]
    }

    pub fn set(&mut self, criterion: Criterion, label: Label) {
        self.0[criterion.index()] = label;
    }

    /// Replace all 13 labels, in [`Criterion::ALL`] order.
    pub fn set_all(&mut self, labels: &[Label]) -> LabelResult<()> {
        if labels.len() != Criterion::COUNT {
            return Err(LabelError::WrongCount {
                expected: Criterion::COUNT,
                actual: labels.len(),
            });
        }
        self.0.copy_from_slice(labels);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, Label)> + '_ {
        Criterion::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    pub fn as_slice(&self) -> &[Label] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_labels() {
        assert_eq!("met".parse::<Label>(), Ok(Label::Met));
        assert_eq!("not met".parse::<Label>(), Ok(Label::NotMet));
        assert!("Met".parse::<Label>().is_err());
        assert!("maybe".parse::<Label>().is_err());
    }

    #[test]
    fn test_integer_labels() {
        assert_eq!(Label::try_from(1), Ok(Label::Met));
        assert_eq!(Label::try_from(0), Ok(Label::NotMet));
        assert_eq!(
            Label::try_from(2),
            Err(LabelError::InvalidValue("2".into()))
        );
    }

    #[test]
    fn test_invert() {
        assert_eq!(Label::Met.invert(), Label::NotMet);
        assert_eq!(Label::NotMet.invert(), Label::Met);
    }

    #[test]
    fn test_labels_default_not_met() {
        let labels = Labels::default();
        assert!(labels.iter().all(|(_, l)| l == Label::NotMet));
    }

    #[test]
    fn test_set_all_requires_thirteen() {
        let mut labels = Labels::default();
        assert!(labels.set_all(&[Label::Met; 3]).is_err());

        labels.set_all(&[Label::Met; Criterion::COUNT]).unwrap();
        assert_eq!(labels.get(Criterion::Mi6Mos), Label::Met);
    }
}
