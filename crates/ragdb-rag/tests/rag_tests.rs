use anyhow::{bail, Result};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use ragdb_core::chunker::TextSplitter;
use ragdb_core::config::Settings;
use ragdb_core::traits::Generator;
use ragdb_embed::HashingEmbedder;
use ragdb_rag::{build_prompt, AddDocumentOutcome, ContextOnlyGenerator, QueryOutcome, RagSystem};
use ragdb_vector::{EngineConfig, RetrievalEngine};

const DIM: usize = 512;

/// Records every prompt and answers with a fixed string.
#[derive(Clone, Default)]
struct ScriptedGenerator {
    prompts: Arc<Mutex<Vec<String>>>,
}

impl Generator for ScriptedGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("scripted answer".to_string())
    }
}

struct FailingGenerator;

impl Generator for FailingGenerator {
    fn generate(&self, _prompt: &str) -> Result<String> {
        bail!("model offline")
    }
}

fn system_with(tmp: &TempDir, generator: Box<dyn Generator>) -> RagSystem {
    let engine = RetrievalEngine::open(EngineConfig::new(tmp.path().join("db"), DIM)).unwrap();
    let splitter = TextSplitter::new(60, 10).unwrap();
    RagSystem::new(engine, splitter, Box::new(HashingEmbedder::new(DIM)), generator).unwrap()
}

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn prompt_without_context_is_the_question() {
    assert_eq!(build_prompt("What is RAG?", &[]), "What is RAG?");
    let prompt = build_prompt("Q?", &["one".to_string(), "two".to_string()]);
    assert!(prompt.contains("one\n\ntwo"));
    assert!(prompt.contains("Question: Q?"));
    assert!(prompt.ends_with("Answer:"));
}

#[test]
fn add_document_reports_chunks_and_tokens() {
    let tmp = TempDir::new().unwrap();
    let rag = system_with(&tmp, Box::new(ScriptedGenerator::default()));
    let body = (0..120).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ");
    let path = write(tmp.path(), "long.txt", &body);

    let outcome = rag.add_document(&path);
    let AddDocumentOutcome::Success(added) = &outcome else { panic!("expected success: {:?}", outcome) };
    assert!(added.chunks_created > 1);
    assert_eq!(added.vector_db_stats.total_documents, added.chunks_created);
    assert!(added.vector_db_stats.is_consistent());
    // Overlap makes the chunk word total exceed the document word count.
    assert!(added.total_tokens > 120);

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["chunks_created"], added.chunks_created);
    assert_eq!(json["file_path"], &*path.display().to_string());
}

#[test]
fn too_short_document_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let rag = system_with(&tmp, Box::new(ScriptedGenerator::default()));
    let path = write(tmp.path(), "tiny.txt", "   hi    ");

    let outcome = rag.add_document(&path);
    assert!(!outcome.is_success());
    assert_eq!(outcome.file_path(), path.display().to_string());
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "error");
    assert!(json["error"].as_str().unwrap().contains("10 characters"));
    assert_eq!(rag.stats().vector_store.total_documents, 0);
}

#[test]
fn unsupported_and_missing_files_are_errors() {
    let tmp = TempDir::new().unwrap();
    let rag = system_with(&tmp, Box::new(ScriptedGenerator::default()));
    let docx = write(tmp.path(), "a.docx", "some text that is long enough");
    assert!(!rag.add_document(&docx).is_success());
    assert!(!rag.add_document(&tmp.path().join("missing.txt")).is_success());
}

#[test]
fn empty_store_sends_bare_question() {
    let tmp = TempDir::new().unwrap();
    let generator = ScriptedGenerator::default();
    let prompts = Arc::clone(&generator.prompts);
    let rag = system_with(&tmp, Box::new(generator));

    let outcome = rag.query("What is the capital of France?", None);
    let QueryOutcome::Success(answer) = outcome else { panic!("query failed") };
    assert_eq!(answer.answer, "scripted answer");
    assert!(answer.context_documents.is_empty());
    assert!(answer.similarity_scores.is_empty());
    assert_eq!(answer.context_length, "What is the capital of France?".chars().count());
    assert_eq!(prompts.lock().unwrap().as_slice(), ["What is the capital of France?".to_string()]);
}

#[test]
fn query_is_grounded_on_closest_document() {
    let tmp = TempDir::new().unwrap();
    let generator = ScriptedGenerator::default();
    let prompts = Arc::clone(&generator.prompts);
    let rag = system_with(&tmp, Box::new(generator));

    let water = write(tmp.path(), "water.txt", "Boil water for one minute to purify water before drinking.");
    let seeds = write(tmp.path(), "seeds.md", "Dry tomato seeds on paper and store them in a cool jar.");
    assert!(rag.add_document(&water).is_success());
    assert!(rag.add_document(&seeds).is_success());

    let QueryOutcome::Success(answer) = rag.query("how do I purify water", Some(1)) else { panic!("query failed") };
    assert_eq!(answer.context_documents.len(), 1);
    assert!(answer.context_documents[0].contains("purify water"));
    assert_eq!(answer.metadata[0]["file_type"], "txt");
    assert_eq!(answer.metadata[0]["source"], &*water.display().to_string());
    assert_eq!(answer.vector_db_stats.total_documents, 2);

    let prompt = prompts.lock().unwrap().last().cloned().unwrap();
    assert!(prompt.contains("Boil water for one minute"));
    assert!(prompt.contains("Question: how do I purify water"));
    assert_eq!(answer.context_length, prompt.chars().count());
}

#[test]
fn k_defaults_to_configured_top_k_then_all_chunks() {
    let tmp = TempDir::new().unwrap();
    let rag = system_with(&tmp, Box::new(ContextOnlyGenerator));
    for (name, text) in [
        ("a.txt", "alpha bravo charlie delta echo"),
        ("b.txt", "foxtrot golf hotel india juliet"),
        ("c.txt", "kilo lima mike november oscar"),
    ] {
        assert!(rag.add_document(&write(tmp.path(), name, text)).is_success());
    }

    let QueryOutcome::Success(all) = rag.query("alpha", None) else { panic!() };
    assert_eq!(all.context_documents.len(), 3);
    for pair in all.similarity_scores.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
    // Without a model the answer is the prompt.
    assert!(all.answer.contains("alpha bravo charlie delta echo"));

    let rag = rag.with_top_k(Some(2));
    let QueryOutcome::Success(two) = rag.query("alpha", None) else { panic!() };
    assert_eq!(two.context_documents.len(), 2);
    let QueryOutcome::Success(one) = rag.query("alpha", Some(1)) else { panic!() };
    assert_eq!(one.context_documents, vec!["alpha bravo charlie delta echo".to_string()]);
}

#[test]
fn generator_failure_is_an_error_outcome() {
    let tmp = TempDir::new().unwrap();
    let rag = system_with(&tmp, Box::new(FailingGenerator));
    let outcome = rag.query("anything?", None);
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "error");
    assert_eq!(json["question"], "anything?");
    assert!(json["error"].as_str().unwrap().contains("model offline"));
}

#[test]
fn embedder_dimension_must_match_store() {
    let tmp = TempDir::new().unwrap();
    let engine = RetrievalEngine::open(EngineConfig::new(tmp.path().join("db"), DIM)).unwrap();
    let splitter = TextSplitter::new(60, 10).unwrap();
    let result = RagSystem::new(
        engine,
        splitter,
        Box::new(HashingEmbedder::new(DIM / 2)),
        Box::new(ContextOnlyGenerator),
    );
    assert!(result.is_err());
}

#[test]
fn add_directory_collects_per_file_outcomes() {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("docs");
    fs::create_dir_all(docs.join("nested")).unwrap();
    write(&docs, "good.txt", "A perfectly reasonable paragraph about composting.");
    write(&docs.join("nested"), "notes.md", "Markdown notes about rainwater collection barrels.");
    write(&docs, "short.txt", "tiny");
    write(&docs, "ignored.bin", "binary data is not listed at all");

    let rag = system_with(&tmp, Box::new(ContextOnlyGenerator));
    let report = rag.add_directory(&docs);
    assert_eq!(report.documents.len(), 3);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.chunks_created(), rag.stats().vector_store.total_documents);
}

#[test]
fn clear_database_empties_store_and_keeps_settings() {
    let tmp = TempDir::new().unwrap();
    let rag = system_with(&tmp, Box::new(ContextOnlyGenerator));
    rag.add_document(&write(tmp.path(), "a.txt", "Some text long enough to index."));
    assert_eq!(rag.stats().vector_store.total_documents, 1);

    rag.clear_database().unwrap();
    let stats = rag.stats();
    assert_eq!(stats.vector_store.total_documents, 0);
    assert_eq!(stats.vector_store.index_size, 0);
    assert_eq!((stats.chunk_size, stats.chunk_overlap), (60, 10));
}

#[test]
fn from_settings_builds_offline_system() {
    let tmp = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.store.db_path = "store".into();
    settings.store.dimension = 32;
    settings.generation.enabled = false;
    settings.query.top_k = Some(1);

    let rag = RagSystem::from_settings(&settings, tmp.path()).unwrap();
    assert_eq!(rag.engine().db_path(), tmp.path().join("store"));
    rag.add_document(&write(tmp.path(), "a.txt", "Solar panels charge the battery bank."));
    rag.add_document(&write(tmp.path(), "b.txt", "Chickens need fresh water every day."));
    let QueryOutcome::Success(answer) = rag.query("battery", None) else { panic!() };
    assert_eq!(answer.context_documents.len(), 1);
    assert_eq!(rag.stats().chunk_size, 500);
}
