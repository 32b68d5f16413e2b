use ragdb_core::{ChunkRecord, Error, Metadata, Result};

/// Chunk texts and metadata, positionally aligned with [`crate::FlatIndex`] ids.
///
/// The two collections only grow together, through [`DocumentStore::append`],
/// so they always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentStore {
    texts: Vec<String>,
    metadatas: Vec<Metadata>,
}

impl DocumentStore {
    pub fn new() -> Self { Self::default() }

    pub fn from_parts(texts: Vec<String>, metadatas: Vec<Metadata>) -> Result<Self> {
        let mut store = Self::new();
        store.append(texts, metadatas)?;
        Ok(store)
    }

    pub fn len(&self) -> usize { self.texts.len() }

    pub fn is_empty(&self) -> bool { self.texts.is_empty() }

    pub fn append(&mut self, texts: Vec<String>, metadatas: Vec<Metadata>) -> Result<()> {
        if texts.len() != metadatas.len() {
            return Err(Error::ArityMismatch {
                texts: texts.len(),
                metadatas: metadatas.len(),
                embeddings: texts.len(),
            });
        }
        self.texts.extend(texts);
        self.metadatas.extend(metadatas);
        Ok(())
    }

    pub fn get(&self, id: usize) -> Result<ChunkRecord<'_>> {
        match (self.texts.get(id), self.metadatas.get(id)) {
            (Some(text), Some(metadata)) => Ok(ChunkRecord { id, text, metadata }),
            _ => Err(Error::IndexOutOfRange { id, len: self.len() }),
        }
    }

    pub fn texts(&self) -> &[String] { &self.texts }

    pub fn metadatas(&self) -> &[Metadata] { &self.metadatas }

    pub fn clear(&mut self) {
        self.texts.clear();
        self.metadatas.clear();
    }
}
