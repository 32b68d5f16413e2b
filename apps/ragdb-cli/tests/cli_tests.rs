use std::path::PathBuf;

use ragdb_cli::args::{parse, Command};
use ragdb_cli::render;
use ragdb_core::{Metadata, StoreStats};
use ragdb_rag::{Answer, QueryOutcome, SystemStats};

fn argv(s: &[&str]) -> Vec<String> {
    s.iter().map(|a| a.to_string()).collect()
}

#[test]
fn no_arguments_starts_interactive_menu() {
    let cli = parse(argv(&[])).unwrap();
    assert_eq!(cli.command, Command::Interactive);
    assert!(!cli.json);
}

#[test]
fn parses_ingest_with_several_paths() {
    let cli = parse(argv(&["--json", "ingest", "a.txt", "docs/"])).unwrap();
    assert!(cli.json);
    assert_eq!(cli.command, Command::Ingest { paths: vec![PathBuf::from("a.txt"), PathBuf::from("docs/")] });
    assert!(parse(argv(&["ingest"])).is_err());
}

#[test]
fn parses_query_and_k() {
    let cli = parse(argv(&["query", "how", "to", "store", "seeds", "--k", "3"])).unwrap();
    assert_eq!(cli.command, Command::Query { question: "how to store seeds".into(), k: Some(3) });
    let cli = parse(argv(&["query", "--k=2", "water?"])).unwrap();
    assert_eq!(cli.command, Command::Query { question: "water?".into(), k: Some(2) });
    assert!(parse(argv(&["query", "x", "--k", "0"])).is_err());
    assert!(parse(argv(&["query", "x", "--k"])).is_err());
    assert!(parse(argv(&["query"])).is_err());
}

#[test]
fn parses_stats_and_clear() {
    assert_eq!(parse(argv(&["stats"])).unwrap().command, Command::Stats);
    assert_eq!(parse(argv(&["clear"])).unwrap().command, Command::Clear { yes: false });
    assert_eq!(parse(argv(&["clear", "--yes"])).unwrap().command, Command::Clear { yes: true });
    assert_eq!(parse(argv(&["-v", "stats"])).unwrap().verbosity, 1);
}

#[test]
fn rejects_unknown_input() {
    assert!(parse(argv(&["frobnicate"])).is_err());
    assert!(parse(argv(&["stats", "--nope"])).is_err());
    assert!(parse(argv(&["stats", "extra"])).is_err());
}

fn stats(total_documents: usize, index_size: usize) -> SystemStats {
    SystemStats {
        vector_store: StoreStats { total_documents, index_size, db_path: PathBuf::from("./vector_db") },
        chunk_size: 500,
        chunk_overlap: 50,
    }
}

#[test]
fn stats_warn_only_when_counts_disagree() {
    let healthy = render::stats(&stats(4, 4));
    assert!(healthy.contains("total documents: 4"));
    assert!(!healthy.contains("disagree"));
    assert!(render::stats(&stats(4, 5)).contains("disagree"));
}

#[test]
fn query_rendering_lists_sources() {
    let mut meta = Metadata::new();
    meta.insert("source".into(), "notes/water.txt".into());
    let outcome = QueryOutcome::Success(Answer {
        question: "water?".into(),
        answer: "Boil it.".into(),
        context_documents: vec!["Boil   water\nfor a minute.".into()],
        metadata: vec![meta],
        similarity_scores: vec![0.75],
        context_length: 120,
        vector_db_stats: StoreStats { total_documents: 1, index_size: 1, db_path: PathBuf::from("db") },
    });
    let text = render::query_outcome(&outcome);
    assert!(text.contains("Boil it."));
    assert!(text.contains("score=0.7500  notes/water.txt"));
    assert!(text.contains("Boil water for a minute."));
    assert!(text.contains("context length: 120 chars"));

    let failed = QueryOutcome::Error { error: "model offline".into(), question: "water?".into() };
    assert!(render::query_outcome(&failed).contains("model offline"));
}
