//! On-disk layout of a vector database directory.
//!
//! Three artifacts, written in this order on every save:
//! - `index.bin`: bincode-encoded header plus the raw row-major vector buffer
//! - `texts.json`: chunk texts, in id order
//! - `metadata.json`: chunk metadata, in id order
//!
//! Each file is written to a temporary sibling and renamed into place, so a
//! crash leaves every artifact either at its old or at its new version. The
//! set as a whole is not atomic.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use ragdb_core::{Error, Metadata, Result};

use crate::index::{FlatIndex, Metric};
use crate::store::DocumentStore;

pub const INDEX_FILE: &str = "index.bin";
pub const TEXTS_FILE: &str = "texts.json";
pub const METADATA_FILE: &str = "metadata.json";

const MAGIC: [u8; 8] = *b"RAGDBIDX";
const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct IndexHeaderRef<'a> {
    magic: [u8; 8],
    version: u32,
    metric: Metric,
    dimension: u64,
    data: &'a [f32],
}

#[derive(Deserialize)]
struct IndexHeader {
    magic: [u8; 8],
    version: u32,
    metric: Metric,
    dimension: u64,
    data: Vec<f32>,
}

/// Everything a database directory holds, as loaded from disk.
#[derive(Debug)]
pub struct Snapshot {
    pub index: FlatIndex,
    pub store: DocumentStore,
}

/// True when all three artifacts are present in `dir`.
pub fn exists(dir: &Path) -> bool {
    [INDEX_FILE, TEXTS_FILE, METADATA_FILE].iter().all(|f| dir.join(f).is_file())
}

/// Load a database directory.
///
/// `Ok(None)` means at least one artifact is missing (a fresh database).
/// An unreadable or undecodable artifact is a `PersistenceUnavailable` error.
///
/// If the texts and metadata files disagree in length, both are cut to the
/// shorter one: only records present in both can be served. The index is
/// returned as stored even if its size differs from the store.
pub fn load(dir: &Path) -> Result<Option<Snapshot>> {
    if !exists(dir) {
        return Ok(None);
    }
    let index = read_index(&dir.join(INDEX_FILE))?;
    let mut texts: Vec<String> = read_json(&dir.join(TEXTS_FILE))?;
    let mut metadatas: Vec<Metadata> = read_json(&dir.join(METADATA_FILE))?;

    if texts.len() != metadatas.len() {
        let keep = texts.len().min(metadatas.len());
        tracing::warn!(
            texts = texts.len(),
            metadatas = metadatas.len(),
            keep,
            "texts and metadata disagree; truncating to common prefix"
        );
        texts.truncate(keep);
        metadatas.truncate(keep);
    }
    let store = DocumentStore::from_parts(texts, metadatas)?;
    Ok(Some(Snapshot { index, store }))
}

/// Write all three artifacts into `dir`, creating it if needed.
pub fn save(dir: &Path, index: &FlatIndex, store: &DocumentStore) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::persistence(dir, e))?;

    let header = IndexHeaderRef {
        magic: MAGIC,
        version: FORMAT_VERSION,
        metric: index.metric(),
        dimension: index.dim() as u64,
        data: index.as_slice(),
    };
    write_atomic(&dir.join(INDEX_FILE), |w| {
        bincode::serialize_into(w, &header).map_err(|e| e.to_string())
    })?;
    write_atomic(&dir.join(TEXTS_FILE), |w| {
        serde_json::to_writer(w, store.texts()).map_err(|e| e.to_string())
    })?;
    write_atomic(&dir.join(METADATA_FILE), |w| {
        serde_json::to_writer(w, store.metadatas()).map_err(|e| e.to_string())
    })?;
    tracing::debug!(path = %dir.display(), records = store.len(), vectors = index.len(), "vector db saved");
    Ok(())
}

fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> std::result::Result<(), String>,
{
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::persistence(path, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer).map_err(|e| Error::persistence(path, e))?;
        writer.flush().map_err(|e| Error::persistence(path, e))?;
    }
    tmp.as_file().sync_all().map_err(|e| Error::persistence(path, e))?;
    tmp.persist(path).map_err(|e| Error::persistence(path, e.error))?;
    Ok(())
}

fn read_index(path: &Path) -> Result<FlatIndex> {
    let file = File::open(path).map_err(|e| Error::persistence(path, e))?;
    let header: IndexHeader =
        bincode::deserialize_from(BufReader::new(file)).map_err(|e| Error::persistence(path, e))?;
    if header.magic != MAGIC {
        return Err(Error::persistence(path, "not a vector index file"));
    }
    if header.version != FORMAT_VERSION {
        return Err(Error::persistence(path, format!("unsupported index version {}", header.version)));
    }
    let dim = usize::try_from(header.dimension).map_err(|e| Error::persistence(path, e))?;
    FlatIndex::from_raw(dim, header.metric, header.data).map_err(|e| Error::persistence(path, e))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| Error::persistence(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::persistence(path, e))
}
