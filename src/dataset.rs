//! Student dataset lookup.
//!
//! The dataset is a JSON file mapping class-label -> list of student records.
//! It is re-read on every request; records are never mutated.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset at {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to parse dataset JSON at {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
}

/// One student record as it appears in the dataset file. Registration and
/// roll numbers are kept as raw JSON scalars: exported spreadsheets deliver
/// them sometimes as strings, sometimes as bare (float) numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub registration_no: Value,
    pub name: String,
    pub roll_no: Value,
    pub section: String,
}

/// Classes in the order they appear in the dataset file, so that a
/// registration number duplicated across classes always resolves to the same
/// record.
pub type Dataset = Vec<(String, Vec<Student>)>;

pub fn load(path: &Path) -> Result<Dataset, DatasetError> {
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse(text: &str) -> Result<Dataset, serde_json::Error> {
    let classes: serde_json::Map<String, Value> = serde_json::from_str(text)?;
    classes
        .into_iter()
        .map(|(class_label, students)| Ok((class_label, serde_json::from_value(students)?)))
        .collect()
}

/// Exhaustive scan across all classes. Registration numbers are assumed
/// unique in the dataset; the first match wins.
pub fn find<'a>(data: &'a Dataset, reg_no: &str) -> Option<(&'a str, &'a Student)> {
    let wanted = reg_no.trim();
    for (class_label, students) in data {
        for student in students {
            if scalar_text(&student.registration_no) == wanted {
                return Some((class_label.as_str(), student));
            }
        }
    }
    None
}

/// The five text fields drawn onto the ticket, normalized for rendering.
#[derive(Debug, Clone)]
pub struct TicketFields {
    pub reg_no: String,
    pub name: String,
    pub class_label: String,
    pub section: String,
    pub roll_no: String,
}

impl TicketFields {
    pub fn extract(class_label: &str, student: &Student) -> Self {
        Self {
            reg_no: scalar_text(&student.registration_no),
            name: student.name.trim().to_uppercase(),
            class_label: class_label.to_string(),
            section: student.section.trim().to_uppercase(),
            roll_no: roll_text(&student.roll_no),
        }
    }
}

fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Roll numbers exported as floats render without the trailing `.0`.
fn roll_text(v: &Value) -> String {
    let text = scalar_text(v);
    match text.strip_suffix(".0") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => text,
    }
}
