//! Domain types shared by the store, the pipeline and the CLI.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Open-ended chunk metadata. Carries at least `source`, `file_type` and
/// `text_length` for chunks produced by the ingestion pipeline.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// A chunk of a source document, as produced by the splitter and consumed by
/// the store. Its id is implicit: the position at which it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: Metadata,
}

impl Chunk {
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self { text: text.into(), metadata }
    }
}

/// A stored record resolved from the store by id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkRecord<'a> {
    pub id: usize,
    pub text: &'a str,
    pub metadata: &'a Metadata,
}

/// Ranked search output as three positionally aligned sequences, ordered by
/// descending score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub texts: Vec<String>,
    pub metadatas: Vec<Metadata>,
    pub scores: Vec<f32>,
}

impl SearchResults {
    pub fn len(&self) -> usize { self.texts.len() }

    pub fn is_empty(&self) -> bool { self.texts.is_empty() }

    pub(crate) fn push(&mut self, text: String, metadata: Metadata, score: f32) {
        self.texts.push(text);
        self.metadatas.push(metadata);
        self.scores.push(score);
    }

    /// Iterate `(text, metadata, score)` triples in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Metadata, f32)> {
        self.texts
            .iter()
            .zip(self.metadatas.iter())
            .zip(self.scores.iter())
            .map(|((t, m), s)| (t.as_str(), m, *s))
    }
}

impl FromIterator<(String, Metadata, f32)> for SearchResults {
    fn from_iter<I: IntoIterator<Item = (String, Metadata, f32)>>(iter: I) -> Self {
        let mut out = SearchResults::default();
        for (text, metadata, score) in iter {
            out.push(text, metadata, score);
        }
        out
    }
}

/// Counts reported by the retrieval engine.
///
/// `total_documents` and `index_size` agree after every completed mutation.
/// A disagreement means a previous process died between the index append and
/// the store append (or between artifact writes) and should be surfaced as a
/// health warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_documents: usize,
    pub index_size: usize,
    pub db_path: PathBuf,
}

impl StoreStats {
    pub fn is_consistent(&self) -> bool { self.total_documents == self.index_size }
}
