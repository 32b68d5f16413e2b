use parking_lot::RwLock;
use std::path::{Path, PathBuf};

use ragdb_core::config::StoreSettings;
use ragdb_core::{Chunk, Error, Metadata, Result, SearchResults, StoreStats};

use crate::index::FlatIndex;
use crate::persist;
use crate::store::DocumentStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub db_path: PathBuf,
    pub dimension: usize,
}

impl EngineConfig {
    pub fn new(db_path: impl Into<PathBuf>, dimension: usize) -> Self {
        Self { db_path: db_path.into(), dimension }
    }

    pub fn from_settings(settings: &StoreSettings, base: &Path) -> Self {
        Self::new(settings.resolved_db_path(base), settings.dimension)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new("./vector_db", 768)
    }
}

struct State {
    index: FlatIndex,
    store: DocumentStore,
}

/// Dense-vector store: an exact inner-product index aligned with a document
/// store, persisted to `db_path` after every mutation.
///
/// Searches share a read lock; `add` and `clear` hold the write lock until the
/// new state is on disk, so readers never see a half-applied batch. There is
/// no cross-process locking: one process owns a `db_path` at a time.
pub struct RetrievalEngine {
    config: EngineConfig,
    state: RwLock<State>,
}

impl RetrievalEngine {
    /// Open the database at `config.db_path`, or start empty.
    ///
    /// Missing or unreadable artifacts are not an error: the engine logs the
    /// cause and starts with an empty index of `config.dimension`.
    pub fn open(config: EngineConfig) -> Result<Self> {
        if config.dimension == 0 {
            return Err(Error::InvalidConfig("dimension must be positive".into()));
        }
        if let Err(e) = std::fs::create_dir_all(&config.db_path) {
            tracing::warn!(path = %config.db_path.display(), error = %e, "cannot create db directory");
        }

        let state = match persist::load(&config.db_path) {
            Ok(Some(snapshot)) => {
                let index = snapshot.index;
                if index.dim() != config.dimension {
                    tracing::warn!(
                        stored = index.dim(),
                        configured = config.dimension,
                        "stored index dimension differs from configuration; using stored"
                    );
                }
                if index.len() != snapshot.store.len() {
                    tracing::warn!(
                        index_size = index.len(),
                        total_documents = snapshot.store.len(),
                        "index and document store disagree"
                    );
                }
                tracing::info!(
                    path = %config.db_path.display(),
                    documents = snapshot.store.len(),
                    "loaded vector db"
                );
                State { index, store: snapshot.store }
            }
            Ok(None) => {
                tracing::info!(path = %config.db_path.display(), dimension = config.dimension, "new vector db");
                State { index: FlatIndex::new(config.dimension)?, store: DocumentStore::new() }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load vector db; starting empty");
                State { index: FlatIndex::new(config.dimension)?, store: DocumentStore::new() }
            }
        };

        Ok(Self { config, state: RwLock::new(state) })
    }

    pub fn db_path(&self) -> &Path { &self.config.db_path }

    /// Dimension of the live index (the stored one if it was loaded from disk).
    pub fn dimension(&self) -> usize { self.state.read().index.dim() }

    /// Append a batch and persist. Returns the new record count.
    ///
    /// Arity and dimension are validated before anything changes. If the save
    /// fails the batch stays in memory and the error is returned. Texts are
    /// stored as given; callers must not pass empty chunk text.
    pub fn add(
        &self,
        texts: Vec<String>,
        metadatas: Vec<Metadata>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<usize> {
        if texts.len() != metadatas.len() || texts.len() != embeddings.len() {
            return Err(Error::ArityMismatch {
                texts: texts.len(),
                metadatas: metadatas.len(),
                embeddings: embeddings.len(),
            });
        }

        let mut state = self.state.write();
        if texts.is_empty() {
            return Ok(state.store.len());
        }
        let added = texts.len();
        let ids = state.index.append(&embeddings)?;
        state.store.append(texts, metadatas)?;
        tracing::info!(added, first_id = ids.start, total = state.store.len(), "added chunks");

        persist::save(&self.config.db_path, &state.index, &state.store)?;
        Ok(state.store.len())
    }

    /// Convenience over [`RetrievalEngine::add`] for splitter output.
    pub fn add_chunks(&self, chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<usize> {
        let (texts, metadatas) = chunks.into_iter().map(|c| (c.text, c.metadata)).unzip();
        self.add(texts, metadatas, embeddings)
    }

    /// Top-`k` records by inner product with `query`, best first.
    ///
    /// An empty store yields empty results whatever the query. Hits whose id
    /// has no stored record are skipped.
    pub fn search(&self, query: &[f32], k: usize) -> Result<SearchResults> {
        let state = self.state.read();
        if state.index.is_empty() || k == 0 {
            return Ok(SearchResults::default());
        }
        let hits = state.index.search(query, k)?;
        let results: SearchResults = hits
            .into_iter()
            .filter_map(|(id, score)| match state.store.get(id) {
                Ok(record) => Some((record.text.to_string(), record.metadata.clone(), score)),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping hit without stored record");
                    None
                }
            })
            .collect();
        tracing::debug!(k, returned = results.len(), "search complete");
        Ok(results)
    }

    pub fn stats(&self) -> StoreStats {
        let state = self.state.read();
        let stats = StoreStats {
            total_documents: state.store.len(),
            index_size: state.index.len(),
            db_path: self.config.db_path.clone(),
        };
        if !stats.is_consistent() {
            tracing::warn!(
                total_documents = stats.total_documents,
                index_size = stats.index_size,
                "store counts are inconsistent"
            );
        }
        stats
    }

    /// Drop every record and persist the empty state. The dimension is kept.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.state.write();
        state.index.reset();
        state.store.clear();
        persist::save(&self.config.db_path, &state.index, &state.store)?;
        tracing::info!(path = %self.config.db_path.display(), "vector db cleared");
        Ok(())
    }
}
