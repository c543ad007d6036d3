//! Subcommand flows over corpus directories.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use cohort_core::rules::load_stopwords;
use cohort_core::text::{remove_stopwords, LabTable};
use cohort_core::{
    evaluate_corpora, normalize, render_table, Classifier, Corpus, Criterion, DrugGazetteer,
    MajorityClassifier, Metrics, RuleSet, RuleSetVersion,
};

use crate::config::{ClassifierChoice, Config};

/// Result of a `predict` run.
#[derive(Debug)]
pub struct PredictOutcome {
    pub corpus: Corpus,
    /// Files written, when an output directory was given
    pub written: Option<usize>,
    /// Scores against the gold corpus, when one was given
    pub metrics: Option<Metrics>,
}

/// Build the configured classifier.
pub fn build_classifier(config: &Config) -> Result<Box<dyn Classifier>> {
    let version = match config.rule_set {
        ClassifierChoice::Baseline => RuleSetVersion::Baseline,
        ClassifierChoice::Improved => RuleSetVersion::Improved,
        ClassifierChoice::Majority => {
            if config.creatinine_threshold.is_some() {
                log::warn!("creatinine_threshold has no effect on the majority classifier");
            }
            return Ok(Box::new(MajorityClassifier::new()));
        }
    };

    let gazetteer = match &config.drug_gazetteer {
        Some(path) => DrugGazetteer::load(path)
            .with_context(|| format!("Failed to load drug list {}", path.display()))?,
        None => DrugGazetteer::bundled().context("Failed to load bundled drug list")?,
    };
    log::debug!("Drug gazetteer: {} names", gazetteer.names().len());

    let mut rules = RuleSet::new(version, Arc::new(gazetteer));
    if let Some(threshold) = config.creatinine_threshold {
        rules = rules.with_creatinine_threshold(threshold);
    }
    Ok(Box::new(rules))
}

/// Label every criterion of `corpus` in place.
///
/// Criteria the classifier does not support get the majority label.
pub fn classify(corpus: &mut Corpus, classifier: &dyn Classifier) -> Result<()> {
    let fallback = MajorityClassifier::new();

    for criterion in Criterion::ALL {
        let documents = corpus.documents_for(criterion, false);
        let labels = if classifier.supports(criterion) {
            classifier.predict(criterion, &documents)?
        } else {
            log::warn!(
                "{} does not cover {}, using the majority label",
                classifier.name(),
                criterion
            );
            fallback.predict(criterion, &documents)?
        };
        corpus.set_labels(criterion, &labels)?;
    }
    Ok(())
}

pub fn predict(
    config: &Config,
    input: &Path,
    gold: Option<&Path>,
    output: Option<&Path>,
) -> Result<PredictOutcome> {
    let classifier = build_classifier(config)?;
    let mut corpus = Corpus::open(input)
        .with_context(|| format!("Failed to open corpus {}", input.display()))?;
    log::info!(
        "Classifying {} patients with the {} classifier",
        corpus.len(),
        classifier.name()
    );
    classify(&mut corpus, classifier.as_ref())?;

    let written = match output {
        Some(dir) => Some(
            corpus
                .write(dir, &config.write)
                .with_context(|| format!("Failed to write predictions to {}", dir.display()))?,
        ),
        None => None,
    };

    let metrics = match gold {
        Some(dir) => Some(evaluate(dir, &corpus)?),
        None => None,
    };

    Ok(PredictOutcome {
        corpus,
        written,
        metrics,
    })
}

fn evaluate(gold_dir: &Path, pred: &Corpus) -> Result<Metrics> {
    let gold = Corpus::open(gold_dir)
        .with_context(|| format!("Failed to open gold corpus {}", gold_dir.display()))?;
    let metrics = evaluate_corpora(&gold, pred).context("Gold and predicted corpora differ")?;
    log::info!("Evaluated {} patients", metrics.patients);
    Ok(metrics)
}

/// Score a predicted corpus directory against a gold one.
pub fn evaluate_dirs(gold: &Path, pred: &Path) -> Result<Metrics> {
    let pred = Corpus::open(pred)
        .with_context(|| format!("Failed to open predicted corpus {}", pred.display()))?;
    evaluate(gold, &pred)
}

/// Metrics as the text table or pretty JSON.
pub fn render_metrics(metrics: &Metrics, json: bool) -> Result<String> {
    if json {
        Ok(format!("{}\n", metrics.to_json()?))
    } else {
        Ok(render_table(metrics))
    }
}

/// Lab tables of every record, keyed by patient id.
pub fn labs(input: &Path) -> Result<String> {
    let corpus = Corpus::open(input)
        .with_context(|| format!("Failed to open corpus {}", input.display()))?;

    let mut tables: BTreeMap<&str, Vec<LabTable>> = BTreeMap::new();
    for patient in corpus.patients() {
        let patient_tables = patient
            .lab_tables()
            .with_context(|| format!("Bad lab table in {}", patient.id))?;
        tables.insert(patient.id.as_str(), patient_tables);
    }
    Ok(serde_json::to_string_pretty(&tables)?)
}

/// Normalize the given text, or read it from `source` when absent.
///
/// Tokens in the configured stopword list are dropped.
pub fn normalize_text(
    config: &Config,
    text: Option<String>,
    source: impl std::io::Read,
) -> Result<String> {
    let text = match text {
        Some(text) => text,
        None => std::io::read_to_string(source).context("Failed to read stdin")?,
    };
    let normalized = normalize(&text);

    match &config.stopwords {
        Some(path) => {
            let stopwords = load_stopwords(path)
                .with_context(|| format!("Failed to load stopwords {}", path.display()))?;
            log::debug!("Loaded {} stopwords", stopwords.len());
            Ok(remove_stopwords(&normalized, &stopwords))
        }
        None => Ok(normalized),
    }
}
