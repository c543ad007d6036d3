//! Rule-based criterion classification.
//!
//! A [`RuleSet`] holds one [`CriterionMatcher`] per supported criterion.
//! Two rule sets exist: [`RuleSetVersion::Baseline`] with plain
//! proximity patterns, and [`RuleSetVersion::Improved`] with word
//! boundaries, sentence-bounded gaps and more preprocessing. The
//! [`MajorityClassifier`] predicts each criterion's majority class.

pub mod baseline;
mod cad;
mod gazetteer;
pub mod improved;
mod majority;
pub mod patterns;

pub use gazetteer::*;
pub use majority::*;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Criterion, Label};

/// Rule engine errors.
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Criterion {criterion} is not supported by the {rule_set} rule set")]
    Unsupported { criterion: Criterion, rule_set: String },

    #[error("Unknown criterion: {0}")]
    UnknownCriterion(String),

    #[error("Unknown rule set: {0}")]
    UnknownRuleSet(String),

    #[error("Invalid gazetteer pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Failed to read list: {0}")]
    Io(#[from] std::io::Error),
}

pub type RuleResult<T> = Result<T, RuleError>;

/// Decides one criterion for one patient document.
pub trait CriterionMatcher: Send + Sync {
    fn criterion(&self) -> Criterion;

    /// True when the document shows the criterion is met.
    fn is_met(&self, document: &str) -> bool;
}

/// Anything that labels documents per criterion.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    fn supports(&self, criterion: Criterion) -> bool;

    /// One label per document, in input order.
    fn predict(&self, criterion: Criterion, documents: &[String]) -> RuleResult<Vec<Label>>;

    /// [`Classifier::predict`] addressed by canonical criterion name.
    fn predict_named(&self, name: &str, documents: &[String]) -> RuleResult<Vec<Label>> {
        let criterion = name
            .parse::<Criterion>()
            .map_err(|e| RuleError::UnknownCriterion(e.0))?;
        self.predict(criterion, documents)
    }
}

/// Which pattern family a [`RuleSet`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSetVersion {
    Baseline,
    Improved,
}

impl RuleSetVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSetVersion::Baseline => "baseline",
            RuleSetVersion::Improved => "improved",
        }
    }

    pub fn default_creatinine_threshold(&self) -> f64 {
        match self {
            RuleSetVersion::Baseline => baseline::CREATININE_THRESHOLD,
            RuleSetVersion::Improved => improved::CREATININE_THRESHOLD,
        }
    }
}

impl fmt::Display for RuleSetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleSetVersion {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "baseline" => Ok(RuleSetVersion::Baseline),
            "improved" => Ok(RuleSetVersion::Improved),
            other => Err(RuleError::UnknownRuleSet(other.to_string())),
        }
    }
}

/// Registry of matchers for one rule-set version.
pub struct RuleSet {
    version: RuleSetVersion,
    matchers: HashMap<Criterion, Box<dyn CriterionMatcher>>,
}

impl RuleSet {
    pub fn new(version: RuleSetVersion, gazetteer: Arc<DrugGazetteer>) -> Self {
        let matchers = match version {
            RuleSetVersion::Baseline => baseline::matchers(gazetteer),
            RuleSetVersion::Improved => improved::matchers(gazetteer),
        };

        Self {
            version,
            matchers: matchers.into_iter().map(|m| (m.criterion(), m)).collect(),
        }
    }

    pub fn baseline(gazetteer: Arc<DrugGazetteer>) -> Self {
        Self::new(RuleSetVersion::Baseline, gazetteer)
    }

    pub fn improved(gazetteer: Arc<DrugGazetteer>) -> Self {
        Self::new(RuleSetVersion::Improved, gazetteer)
    }

    /// Replace the CREATININE cutoff. Values strictly above it count.
    pub fn with_creatinine_threshold(mut self, threshold: f64) -> Self {
        let matcher: Box<dyn CriterionMatcher> = match self.version {
            RuleSetVersion::Baseline => Box::new(baseline::Creatinine::new(threshold)),
            RuleSetVersion::Improved => Box::new(improved::Creatinine::new(threshold)),
        };
        self.matchers.insert(Criterion::Creatinine, matcher);
        self
    }

    pub fn version(&self) -> RuleSetVersion {
        self.version
    }

    /// Supported criteria in canonical order.
    pub fn criteria(&self) -> Vec<Criterion> {
        Criterion::ALL
            .iter()
            .copied()
            .filter(|c| self.matchers.contains_key(c))
            .collect()
    }
}

impl Classifier for RuleSet {
    fn name(&self) -> &str {
        self.version.as_str()
    }

    fn supports(&self, criterion: Criterion) -> bool {
        self.matchers.contains_key(&criterion)
    }

    fn predict(&self, criterion: Criterion, documents: &[String]) -> RuleResult<Vec<Label>> {
        let matcher = self
            .matchers
            .get(&criterion)
            .ok_or_else(|| RuleError::Unsupported {
                criterion,
                rule_set: self.version.to_string(),
            })?;

        let labels: Vec<Label> = documents
            .par_iter()
            .map(|doc| Label::from(matcher.is_met(doc)))
            .collect();

        log::debug!(
            "{} {}: {} of {} documents met",
            self.version,
            criterion,
            labels.iter().filter(|l| l.is_met()).count(),
            labels.len()
        );
        Ok(labels)
    }
}
