//! Tagged results of the pipeline operations, serialised with a `status` field.

use serde::Serialize;
use std::path::PathBuf;

use ragdb_core::extract::ExtractionReport;
use ragdb_core::{Metadata, StoreStats};

#[derive(Debug, Clone, Serialize)]
pub struct DocumentAdded {
    pub file_path: String,
    pub chunks_created: usize,
    pub total_tokens: usize,
    pub vector_db_stats: StoreStats,
    pub extraction: ExtractionReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AddDocumentOutcome {
    Success(DocumentAdded),
    Error { error: String, file_path: String },
}

impl AddDocumentOutcome {
    pub fn is_success(&self) -> bool { matches!(self, Self::Success(_)) }

    pub fn file_path(&self) -> &str {
        match self {
            Self::Success(added) => &added.file_path,
            Self::Error { file_path, .. } => file_path,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    pub context_documents: Vec<String>,
    pub metadata: Vec<Metadata>,
    pub similarity_scores: Vec<f32>,
    /// Prompt length in characters.
    pub context_length: usize,
    pub vector_db_stats: StoreStats,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum QueryOutcome {
    Success(Answer),
    Error { error: String, question: String },
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool { matches!(self, Self::Success(_)) }
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryReport {
    pub root: PathBuf,
    pub documents: Vec<AddDocumentOutcome>,
}

impl DirectoryReport {
    pub fn succeeded(&self) -> usize { self.documents.iter().filter(|d| d.is_success()).count() }

    pub fn failed(&self) -> usize { self.documents.len() - self.succeeded() }

    pub fn chunks_created(&self) -> usize {
        self.documents
            .iter()
            .map(|d| match d {
                AddDocumentOutcome::Success(added) => added.chunks_created,
                AddDocumentOutcome::Error { .. } => 0,
            })
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemStats {
    pub vector_store: StoreStats,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}
