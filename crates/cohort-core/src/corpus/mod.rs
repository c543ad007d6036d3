//! A directory of patient XML files.

mod reader;
mod writer;

pub use reader::*;
pub use writer::*;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{Criterion, InvalidRecordDate, Label, Labels, Patient};

/// Corpus errors.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: {source}")]
    InvalidDate {
        file: String,
        #[source]
        source: InvalidRecordDate,
    },

    #[error("{file}: invalid label {value:?} for {criterion}")]
    InvalidLabel {
        file: String,
        criterion: Criterion,
        value: String,
    },

    #[error("Expected {expected} labels, got {actual}")]
    LabelCount { expected: usize, actual: usize },

    #[error("Refusing to write into the source directory {0}")]
    SameDirectory(PathBuf),

    #[error("{0} already exists (overwrite not allowed)")]
    AlreadyExists(PathBuf),

    #[error("{0} exists and is not a file")]
    NotAFile(PathBuf),
}

pub type CorpusResult<T> = Result<T, CorpusError>;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CorpusError + '_ {
    move |source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Patients of one corpus directory, ordered by file name.
#[derive(Debug, Clone)]
pub struct Corpus {
    dir: Option<PathBuf>,
    patients: Vec<Patient>,
}

impl Corpus {
    /// Read every `*.xml` file in `dir`.
    pub fn open(dir: impl AsRef<Path>) -> CorpusResult<Self> {
        let dir = dir.as_ref();
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(io_error(dir))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "xml"))
            .collect();
        files.sort();

        let patients = files
            .iter()
            .map(|path| Self::read_patient(path))
            .collect::<CorpusResult<Vec<_>>>()?;

        log::info!("Loaded {} patients from {}", patients.len(), dir.display());
        Ok(Self {
            dir: Some(dir.to_path_buf()),
            patients,
        })
    }

    fn read_patient(path: &Path) -> CorpusResult<Patient> {
        let xml = fs::read_to_string(path).map_err(io_error(path))?;
        let id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let labels = parse_tags(&xml, &id)?;
        let text = parse_text(&xml);
        Patient::new(id.clone(), text, labels).map_err(|source| CorpusError::InvalidDate {
            file: id,
            source,
        })
    }

    /// An in-memory corpus with no source directory.
    pub fn from_patients(patients: Vec<Patient>) -> Self {
        Self {
            dir: None,
            patients,
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn patient_ids(&self) -> Vec<&str> {
        self.patients.iter().map(|p| p.id.as_str()).collect()
    }

    /// One document per patient.
    pub fn documents(&self, months: Option<u32>, clean: bool) -> Vec<String> {
        self.patients
            .iter()
            .map(|p| p.document(months, clean))
            .collect()
    }

    /// Documents restricted to the criterion's recency window.
    pub fn documents_for(&self, criterion: Criterion, clean: bool) -> Vec<String> {
        self.documents(criterion.months(), clean)
    }

    pub fn labels(&self, criterion: Criterion) -> Vec<Label> {
        self.patients.iter().map(|p| p.label(criterion)).collect()
    }

    /// Replace one criterion's labels, one per patient in order.
    pub fn set_labels(&mut self, criterion: Criterion, labels: &[Label]) -> CorpusResult<()> {
        if labels.len() != self.patients.len() {
            return Err(CorpusError::LabelCount {
                expected: self.patients.len(),
                actual: labels.len(),
            });
        }
        for (patient, label) in self.patients.iter_mut().zip(labels) {
            patient.set_label(criterion, *label);
        }
        Ok(())
    }

    /// Patient ids with their labels, for evaluation.
    pub fn labeled(&self) -> Vec<(&str, &Labels)> {
        self.patients
            .iter()
            .map(|p| (p.id.as_str(), &p.labels))
            .collect()
    }

    /// Write every patient to `dir`, returning the number of files written.
    pub fn write(&self, dir: impl AsRef<Path>, options: &WriteOptions) -> CorpusResult<usize> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(io_error(dir))?;

        if let Some(source) = &self.dir {
            let out = dir.canonicalize().map_err(io_error(dir))?;
            let src = source.canonicalize().map_err(io_error(source))?;
            if out == src {
                return Err(CorpusError::SameDirectory(out));
            }
        }

        for patient in &self.patients {
            let path = dir.join(&patient.id);
            if path.exists() {
                if !path.is_file() {
                    return Err(CorpusError::NotAFile(path));
                }
                if !options.overwrite {
                    return Err(CorpusError::AlreadyExists(path));
                }
            }
            fs::write(&path, to_xml(patient, options)).map_err(io_error(&path))?;
        }

        log::info!("Wrote {} patients to {}", self.patients.len(), dir.display());
        Ok(self.patients.len())
    }
}
