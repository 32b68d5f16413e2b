use anyhow::{anyhow, bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use ragdb_core::chunker::TextSplitter;
use ragdb_core::config::Settings;
use ragdb_core::extract::{document_metadata, extract_text, list_documents};
use ragdb_core::traits::{Embedder, Generator};
use ragdb_core::{Error, SearchResults};
use ragdb_embed::embedder_from_settings;
use ragdb_vector::{EngineConfig, RetrievalEngine};

use crate::generate::generator_from_settings;
use crate::outcome::{AddDocumentOutcome, Answer, DirectoryReport, DocumentAdded, QueryOutcome, SystemStats};
use crate::prompt::build_prompt;

/// Extracted text shorter than this (after trimming) is not worth indexing.
const MIN_TEXT_CHARS: usize = 10;

/// Retrieval-augmented question answering over a persistent vector store.
pub struct RagSystem {
    engine: RetrievalEngine,
    splitter: TextSplitter,
    embedder: Box<dyn Embedder>,
    generator: Box<dyn Generator>,
    top_k: Option<usize>,
}

impl RagSystem {
    /// Fails if the embedder does not produce vectors of the store's dimension.
    pub fn new(
        engine: RetrievalEngine,
        splitter: TextSplitter,
        embedder: Box<dyn Embedder>,
        generator: Box<dyn Generator>,
    ) -> Result<Self> {
        if embedder.dim() != engine.dimension() {
            return Err(Error::DimensionMismatch { expected: engine.dimension(), actual: embedder.dim() })
                .context("embedder does not match the vector store");
        }
        Ok(Self { engine, splitter, embedder, generator, top_k: None })
    }

    /// Build every component from settings; relative paths resolve against `base`.
    pub fn from_settings(settings: &Settings, base: &Path) -> Result<Self> {
        settings.validate()?;
        let engine = RetrievalEngine::open(EngineConfig::from_settings(&settings.store, base))?;
        let splitter = TextSplitter::from_settings(&settings.chunking)?;
        let embedder = embedder_from_settings(&settings.embedding, engine.dimension())?;
        let generator = generator_from_settings(&settings.generation)?;
        Ok(Self::new(engine, splitter, embedder, generator)?.with_top_k(settings.query.top_k))
    }

    /// Default number of chunks retrieved per query; `None` means all of them.
    pub fn with_top_k(mut self, top_k: Option<usize>) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn engine(&self) -> &RetrievalEngine { &self.engine }

    pub fn add_document(&self, path: &Path) -> AddDocumentOutcome {
        match self.try_add_document(path) {
            Ok(added) => {
                tracing::info!(
                    file = %path.display(),
                    chunks = added.chunks_created,
                    total_documents = added.vector_db_stats.total_documents,
                    "document added"
                );
                AddDocumentOutcome::Success(added)
            }
            Err(e) => {
                tracing::error!(file = %path.display(), error = %format!("{:#}", e), "failed to add document");
                AddDocumentOutcome::Error { error: format!("{:#}", e), file_path: path.display().to_string() }
            }
        }
    }

    fn try_add_document(&self, path: &Path) -> Result<DocumentAdded> {
        let extraction = extract_text(path)?;
        tracing::info!(file = %path.display(), chars = extraction.text.chars().count(), "text extracted");
        if extraction.text.trim().chars().count() < MIN_TEXT_CHARS {
            bail!("extracted text is empty or shorter than {} characters", MIN_TEXT_CHARS);
        }

        let metadata = document_metadata(path, &extraction.text);
        let chunks = self.splitter.split(&extraction.text, &metadata);
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let total_tokens: usize = texts.iter().map(|t| t.split_whitespace().count()).sum();

        let embeddings = self.embedder.embed_batch(&texts).context("embedding chunks")?;
        tracing::debug!(embeddings = embeddings.len(), "chunks embedded");

        let chunks_created = chunks.len();
        self.engine.add_chunks(chunks, embeddings)?;
        Ok(DocumentAdded {
            file_path: path.display().to_string(),
            chunks_created,
            total_tokens,
            vector_db_stats: self.engine.stats(),
            extraction: extraction.report,
        })
    }

    /// Add every supported file under `dir`, one outcome per file.
    pub fn add_directory(&self, dir: &Path) -> DirectoryReport {
        let files = list_documents(dir);
        if files.is_empty() {
            tracing::warn!(dir = %dir.display(), "no supported documents found");
        }
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut documents = Vec::with_capacity(files.len());
        for file in &files {
            let name = file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            pb.set_message(name);
            documents.push(self.add_document(file));
            pb.inc(1);
        }
        let report = DirectoryReport { root: dir.to_path_buf(), documents };
        pb.finish_with_message(format!("{} added, {} failed", report.succeeded(), report.failed()));
        report
    }

    /// Answer `question`, grounded on the `k` closest chunks.
    ///
    /// `k` falls back to the configured `top_k`, then to every stored chunk.
    /// With an empty store the bare question goes to the generator.
    pub fn query(&self, question: &str, k: Option<usize>) -> QueryOutcome {
        match self.try_query(question, k) {
            Ok(answer) => QueryOutcome::Success(answer),
            Err(e) => {
                tracing::error!(error = %format!("{:#}", e), "query failed");
                QueryOutcome::Error { error: format!("{:#}", e), question: question.to_string() }
            }
        }
    }

    fn try_query(&self, question: &str, k: Option<usize>) -> Result<Answer> {
        let stats = self.engine.stats();
        let results = if stats.total_documents == 0 {
            tracing::warn!("vector store is empty; answering without context");
            SearchResults::default()
        } else {
            let query = self
                .embedder
                .embed_batch(&[question.to_string()])
                .context("embedding question")?
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("embedder returned no vector for the question"))?;
            let k = k.or(self.top_k).unwrap_or(stats.total_documents);
            let results = self.engine.search(&query, k)?;
            tracing::info!(k, retrieved = results.len(), "context retrieved");
            results
        };

        let prompt = build_prompt(question, &results.texts);
        let context_length = prompt.chars().count();
        tracing::info!(context_length, "generating answer");
        let answer = self.generator.generate(&prompt).context("generating answer")?;

        Ok(Answer {
            question: question.to_string(),
            answer,
            context_documents: results.texts,
            metadata: results.metadatas,
            similarity_scores: results.scores,
            context_length,
            vector_db_stats: stats,
        })
    }

    pub fn stats(&self) -> SystemStats {
        SystemStats {
            vector_store: self.engine.stats(),
            chunk_size: self.splitter.chunk_size(),
            chunk_overlap: self.splitter.chunk_overlap(),
        }
    }

    pub fn clear_database(&self) -> ragdb_core::Result<()> {
        self.engine.clear()
    }
}
