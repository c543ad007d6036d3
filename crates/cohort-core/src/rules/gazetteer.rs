//! Drug gazetteer and stopword lists.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use regex::{Regex, RegexBuilder};

use super::RuleResult;

const BUNDLED_CAD_DRUGS: &str = include_str!("../../data/cad_drugs.txt");

/// Names of drugs used to treat coronary artery disease.
///
/// Matching is whole-word and case-insensitive. An empty gazetteer
/// matches nothing.
#[derive(Debug, Clone)]
pub struct DrugGazetteer {
    names: Vec<String>,
    pattern: Option<Regex>,
}

fn read_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

impl DrugGazetteer {
    /// Build from a list of names. Blank names are skipped.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> RuleResult<Self> {
        let names: Vec<String> = names
            .iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();

        let pattern = if names.is_empty() {
            None
        } else {
            let alternation = names
                .iter()
                .map(|n| regex::escape(n))
                .collect::<Vec<_>>()
                .join("|");
            Some(
                RegexBuilder::new(&format!(r"\b(?:{})\b", alternation))
                    .case_insensitive(true)
                    .build()?,
            )
        };

        Ok(Self { names, pattern })
    }

    /// Load a newline-separated name list.
    pub fn load(path: impl AsRef<Path>) -> RuleResult<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let names = read_lines(&contents);
        log::debug!("Loaded {} drug names from {}", names.len(), path.as_ref().display());
        Self::from_names(&names)
    }

    /// The list shipped with the crate.
    pub fn bundled() -> RuleResult<Self> {
        Self::from_names(&read_lines(BUNDLED_CAD_DRUGS))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of distinct drug names mentioned, ignoring case.
    pub fn distinct_matches(&self, text: &str) -> usize {
        let Some(pattern) = &self.pattern else {
            return 0;
        };
        pattern
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Load a newline-separated stopword list.
pub fn load_stopwords(path: impl AsRef<Path>) -> RuleResult<HashSet<String>> {
    let contents = fs::read_to_string(path.as_ref())?;
    Ok(read_lines(&contents).into_iter().collect())
}
