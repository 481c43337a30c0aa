//! Record source: labelled text observations from JSONL dataset files.
//!
//! Each line is an independent JSON record. A record is usable when it has a
//! non-empty text under the first present key of [`TEXT_KEYS`] and a non-null
//! label under the first present key of [`LABEL_KEYS`]. Anything else is
//! dropped without being counted.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{BenchmarkError, BenchmarkResult};

/// Text fields in fallback order.
pub const TEXT_KEYS: &[&str] = &["textCleaned", "body", "text", "title"];

/// Ground-truth label fields in fallback order.
pub const LABEL_KEYS: &[&str] = &["clusterNo", "class", "label"];

/// Ground-truth label. Opaque to the benchmark apart from equality and hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    /// Integral label (e.g. `clusterNo`).
    Int(i64),
    /// Any other scalar, by its text.
    Text(String),
}

impl Label {
    /// Convert a JSON value; `None` for null.
    pub fn from_json(value: &Value) -> Option<Label> {
        match value {
            Value::Null => None,
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => Label::Int(i),
                None => Label::Text(n.to_string()),
            }),
            Value::String(s) => Some(Label::Text(s.clone())),
            other => Some(Label::Text(other.to_string())),
        }
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Label::Int(value)
    }
}

impl From<i32> for Label {
    fn from(value: i32) -> Self {
        Label::Int(i64::from(value))
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Text(value.to_string())
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Int(i) => write!(f, "{}", i),
            Label::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One labelled text from the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Zero-based position of the record in its source.
    pub sequence_index: u64,
    /// Raw text.
    pub text: String,
    /// Ground-truth label.
    pub label: Label,
}

impl Observation {
    /// Create an observation.
    pub fn new(sequence_index: u64, text: impl Into<String>, label: impl Into<Label>) -> Self {
        Self {
            sequence_index,
            text: text.into(),
            label: label.into(),
        }
    }

    /// Extract an observation from a parsed record, if it has usable fields.
    pub fn from_record(sequence_index: u64, record: &Map<String, Value>) -> Option<Self> {
        let text = TEXT_KEYS
            .iter()
            .filter_map(|key| record.get(*key))
            .filter_map(Value::as_str)
            .find(|s| !s.is_empty())?;
        let label = LABEL_KEYS
            .iter()
            .filter_map(|key| record.get(*key))
            .find_map(Label::from_json)?;

        Some(Self {
            sequence_index,
            text: text.to_string(),
            label,
        })
    }

    /// Parse one JSONL line.
    pub fn parse_line(sequence_index: u64, line: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(record)) => Self::from_record(sequence_index, &record),
            _ => None,
        }
    }
}

/// Find the file for a dataset: `dir/filename`, then `dir/filename.json`.
pub fn resolve_dataset_path(dir: &Path, filename: &str) -> Option<PathBuf> {
    let raw = dir.join(filename);
    if raw.is_file() {
        return Some(raw);
    }
    let with_ext = dir.join(format!("{filename}.json"));
    with_ext.is_file().then_some(with_ext)
}

/// Streaming reader over a JSONL dataset file.
pub struct JsonlRecordSource {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: u64,
}

impl JsonlRecordSource {
    /// Open a dataset file.
    pub fn open<P: AsRef<Path>>(path: P) -> BenchmarkResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| BenchmarkError::Io {
            path: path.clone(),
            source: e,
        })?;
        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }

    /// Path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for JsonlRecordSource {
    type Item = Observation;

    fn next(&mut self) -> Option<Observation> {
        loop {
            let line = self.lines.next()?;
            let line_no = self.line_no;
            self.line_no += 1;

            match line {
                Ok(line) => {
                    if let Some(observation) = Observation::parse_line(line_no, &line) {
                        return Some(observation);
                    }
                    debug!(path = %self.path.display(), line = line_no, "dropping unusable record");
                }
                Err(e) => {
                    debug!(path = %self.path.display(), line = line_no, error = %e, "dropping unreadable line");
                }
            }
        }
    }
}
