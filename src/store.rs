//! In-memory accumulation of analyzed comments.
//!
//! A [`RecordStore`] lives for one session and only grows: comments are
//! appended in the order the user submits them and exported in that same
//! order. There is no removal. The store takes `&mut self` for appends and
//! does no locking of its own; share it between threads only behind a lock.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::classifier::SentimentClassifier;
use crate::error::CoreError;
use crate::export;
use crate::label::SentimentLabel;
use crate::normalizer::normalize;

/// A normalized comment and the sentiment its raw form was classified as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    text: String,
    label: SentimentLabel,
}

impl Record {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn label(&self) -> SentimentLabel {
        self.label
    }
}

#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

/// Rejects input that is blank once surrounding whitespace is trimmed.
pub fn validate_input(raw: &str) -> Result<&str, CoreError> {
    if raw.trim().is_empty() {
        Err(CoreError::EmptyInput)
    } else {
        Ok(raw)
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Classifies `raw` and stores its normalized form.
    ///
    /// The classifier sees the text exactly as typed, since accents and
    /// punctuation can carry sentiment; only the stored copy is normalized.
    /// Nothing is stored when validation or classification fails.
    pub fn append<C>(&mut self, raw: &str, classifier: &C) -> Result<&Record, CoreError>
    where
        C: SentimentClassifier + ?Sized,
    {
        let raw = validate_input(raw)?;
        let label = classifier.classify(raw).map_err(|err| {
            warn!("[store] classification failed, nothing appended: {err}");
            err
        })?;
        self.append_classified(raw, label)
    }

    /// Stores `raw` with a label obtained elsewhere, e.g. from a classifier
    /// run on a background thread. Blank input is still rejected.
    pub fn append_classified(
        &mut self,
        raw: &str,
        label: SentimentLabel,
    ) -> Result<&Record, CoreError> {
        let raw = validate_input(raw)?;
        let record = Record {
            text: normalize(raw),
            label,
        };
        debug!(
            "[store] appending record #{} (class {})",
            self.records.len() + 1,
            label
        );
        self.records.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    /// Writes every record, in insertion order, as CSV to `path`,
    /// replacing whatever is there. An empty store is refused rather than
    /// producing a header-only file.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        let path = path.as_ref();
        if self.records.is_empty() {
            return Err(CoreError::NothingToExport);
        }
        export::write_atomically(path, &self.records).map_err(|source| {
            warn!("[store] export to {:?} failed: {source}", path);
            CoreError::ExportWriteFailed {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!("[store] exported {} records to {:?}", self.records.len(), path);
        Ok(())
    }
}
