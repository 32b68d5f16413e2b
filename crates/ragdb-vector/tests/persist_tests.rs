use std::fs;
use tempfile::TempDir;

use ragdb_core::{Error, Metadata};
use ragdb_vector::persist::{self, INDEX_FILE, METADATA_FILE, TEXTS_FILE};
use ragdb_vector::{DocumentStore, FlatIndex};

fn sample() -> (FlatIndex, DocumentStore) {
    let mut index = FlatIndex::new(3).unwrap();
    index
        .append(&[vec![-0.0, 1e-38, f32::MAX], vec![0.1, -0.2, 0.333_333_34]])
        .unwrap();
    let mut m = Metadata::new();
    m.insert("source".into(), "doc.pdf".into());
    m.insert("chunk_index".into(), 1.into());
    m.insert("weight".into(), 1.0715660391465826e-75_f64.into());
    m.insert("ratio".into(), 0.1_f64.into());
    m.insert("nested".into(), serde_json::json!({"pages": [1, 2], "ok": true}));
    let store = DocumentStore::from_parts(
        vec!["héllo wörld".into(), "second\nline".into()],
        vec![Metadata::new(), m],
    )
    .unwrap();
    (index, store)
}

#[test]
fn missing_directory_loads_as_none() {
    let tmp = TempDir::new().unwrap();
    assert!(persist::load(&tmp.path().join("nope")).unwrap().is_none());
}

#[test]
fn round_trip_is_bit_exact() {
    let tmp = TempDir::new().unwrap();
    let (index, store) = sample();
    persist::save(tmp.path(), &index, &store).unwrap();
    assert!(persist::exists(tmp.path()));

    let snapshot = persist::load(tmp.path()).unwrap().expect("all artifacts present");
    assert_eq!(snapshot.index.dim(), 3);
    let bits = |s: &[f32]| s.iter().map(|f| f.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(snapshot.index.as_slice()), bits(index.as_slice()));
    assert_eq!(snapshot.store, store);
}

#[test]
fn saving_twice_produces_identical_files() {
    let tmp = TempDir::new().unwrap();
    let (index, store) = sample();
    persist::save(tmp.path(), &index, &store).unwrap();
    let first: Vec<Vec<u8>> =
        [INDEX_FILE, TEXTS_FILE, METADATA_FILE].iter().map(|f| fs::read(tmp.path().join(f)).unwrap()).collect();
    persist::save(tmp.path(), &index, &store).unwrap();
    let second: Vec<Vec<u8>> =
        [INDEX_FILE, TEXTS_FILE, METADATA_FILE].iter().map(|f| fs::read(tmp.path().join(f)).unwrap()).collect();
    assert_eq!(first, second);
}

#[test]
fn foreign_index_file_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let (index, store) = sample();
    persist::save(tmp.path(), &index, &store).unwrap();
    fs::write(tmp.path().join(INDEX_FILE), b"FAISS-ish garbage that is long enough").unwrap();
    assert!(matches!(persist::load(tmp.path()), Err(Error::PersistenceUnavailable { .. })));
}

#[test]
fn truncated_index_file_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let (index, store) = sample();
    persist::save(tmp.path(), &index, &store).unwrap();
    let path = tmp.path().join(INDEX_FILE);
    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 5]).unwrap();
    assert!(matches!(persist::load(tmp.path()), Err(Error::PersistenceUnavailable { .. })));
}

#[test]
fn texts_and_metadata_are_cut_to_common_length() {
    let tmp = TempDir::new().unwrap();
    let (index, store) = sample();
    persist::save(tmp.path(), &index, &store).unwrap();
    fs::write(tmp.path().join(METADATA_FILE), b"[{}]").unwrap();

    let snapshot = persist::load(tmp.path()).unwrap().unwrap();
    assert_eq!(snapshot.store.len(), 1);
    assert_eq!(snapshot.store.get(0).unwrap().text, "héllo wörld");
    assert_eq!(snapshot.index.len(), 2);
}
