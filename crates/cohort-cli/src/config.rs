//! Run configuration: a JSON file, then command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cohort_core::WriteOptions;
use serde::{Deserialize, Serialize};

/// Which classifier labels the criteria.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierChoice {
    Baseline,
    #[default]
    Improved,
    Majority,
}

/// Settings for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rule_set: ClassifierChoice,
    /// Overrides the rule set's own CREATININE cutoff
    pub creatinine_threshold: Option<f64>,
    /// Newline-delimited drug names; the bundled list when absent
    pub drug_gazetteer: Option<PathBuf>,
    /// Newline-delimited tokens dropped by `normalize`
    pub stopwords: Option<PathBuf>,
    pub write: WriteOptions,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// The file at `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(rule_set) = overrides.rule_set {
            self.rule_set = rule_set;
        }
        if let Some(threshold) = overrides.creatinine_threshold {
            self.creatinine_threshold = Some(threshold);
        }
        if let Some(path) = &overrides.drug_gazetteer {
            self.drug_gazetteer = Some(path.clone());
        }
        if overrides.no_text {
            self.write.include_text = false;
        }
        if overrides.overwrite {
            self.write.overwrite = true;
        }
        self
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct Overrides {
    /// Classifier to use
    #[arg(long, value_enum)]
    pub rule_set: Option<ClassifierChoice>,

    /// CREATININE cutoff (values strictly above it count)
    #[arg(long)]
    pub creatinine_threshold: Option<f64>,

    /// Drug name list for ADVANCED-CAD
    #[arg(long)]
    pub drug_gazetteer: Option<PathBuf>,

    /// Write TAGS only
    #[arg(long)]
    pub no_text: bool,

    /// Replace existing output files
    #[arg(long)]
    pub overwrite: bool,
}
