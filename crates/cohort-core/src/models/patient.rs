//! Patient and record models.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Criterion, Label, Labels};
use crate::text::{self, LabTable, LabTableExtractor, TextResult};

lazy_static! {
    /// A record is a `Record date:` header followed by its body, closed by
    /// a rule of at least 100 asterisks.
    static ref RECORD: Regex = Regex::new(
        r"(?s).*?Record date: ([0-9]{4}-[0-9]{2}-[0-9]{2})\s*(.*?)\s*\*{100,}"
    )
    .unwrap();
}

/// A record header carried a date that does not exist in the calendar.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid record date: {0}")]
pub struct InvalidRecordDate(pub String);

/// One dated clinical note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Visit date
    pub date: NaiveDate,
    /// Note text as written
    pub raw_text: String,
    /// Normalized tokens of the note (see [`text::normalize`])
    pub clean_text: String,
    /// Calendar months between this record and the most recent one
    pub months: u32,
}

/// A patient: longitudinal record text plus the 13 criterion labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    /// File name the patient was read from (e.g. "180.xml")
    pub id: String,
    /// Full record text
    pub text: String,
    /// Records in document order
    pub records: Vec<Record>,
    /// Criterion labels
    pub labels: Labels,
}

/// Month difference `later - earlier`, ignoring the day of month.
pub fn months_difference(earlier: NaiveDate, later: NaiveDate) -> i32 {
    (later.year() * 12 + later.month() as i32) - (earlier.year() * 12 + earlier.month() as i32)
}

/// Split a patient text into dated records.
///
/// Month offsets are relative to the most recent record date.
pub fn split_records(text: &str) -> Result<Vec<Record>, InvalidRecordDate> {
    let mut dated = Vec::new();
    for caps in RECORD.captures_iter(text) {
        let date_str = &caps[1];
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|_| InvalidRecordDate(date_str.to_string()))?;
        dated.push((date, caps[2].to_string()));
    }

    let Some(now) = dated.iter().map(|(d, _)| *d).max() else {
        return Ok(Vec::new());
    };

    Ok(dated
        .into_iter()
        .map(|(date, raw_text)| Record {
            clean_text: text::normalize(&raw_text),
            months: months_difference(date, now) as u32,
            date,
            raw_text,
        })
        .collect())
}

impl Patient {
    /// Build a patient from its record text, splitting the records.
    pub fn new(id: String, text: String, labels: Labels) -> Result<Self, InvalidRecordDate> {
        let records = split_records(&text)?;
        if records.is_empty() && !text.trim().is_empty() {
            log::warn!("Patient {} has text but no dated records", id);
        }
        Ok(Self {
            id,
            text,
            records,
            labels,
        })
    }

    /// Records within `months` of the most recent one (all when `None`).
    pub fn records(&self, months: Option<u32>, clean: bool) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| months.map_or(true, |m| r.months <= m))
            .map(|r| {
                if clean {
                    r.clean_text.as_str()
                } else {
                    r.raw_text.as_str()
                }
            })
            .collect()
    }

    /// Selected records joined into one document.
    pub fn document(&self, months: Option<u32>, clean: bool) -> String {
        self.records(months, clean).join("\n")
    }

    pub fn label(&self, criterion: Criterion) -> Label {
        self.labels.get(criterion)
    }

    pub fn set_label(&mut self, criterion: Criterion, label: Label) {
        self.labels.set(criterion, label);
    }

    /// Lab tables found in each record, in record order.
    pub fn lab_tables(&self) -> TextResult<Vec<LabTable>> {
        let extractor = LabTableExtractor::new();
        self.records
            .iter()
            .map(|r| extractor.extract_record(&r.raw_text).map(|e| e.table))
            .collect()
    }
}
