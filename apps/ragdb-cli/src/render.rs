//! Human-readable output for the pipeline results.

use std::fmt::Write;

use ragdb_rag::{AddDocumentOutcome, DirectoryReport, QueryOutcome, SystemStats};

pub fn add_outcome(outcome: &AddDocumentOutcome) -> String {
    match outcome {
        AddDocumentOutcome::Success(added) => {
            let mut out = format!(
                "✅ Added {}\n   - chunks created: {}\n   - total tokens: {}",
                added.file_path, added.chunks_created, added.total_tokens
            );
            for (page, reason) in added.extraction.skipped() {
                let _ = write!(out, "\n   - page {} skipped: {}", page, reason);
            }
            out
        }
        AddDocumentOutcome::Error { error, file_path } => format!("❌ Failed to add {}: {}", file_path, error),
    }
}

pub fn directory_report(report: &DirectoryReport) -> String {
    let mut out = String::new();
    for doc in &report.documents {
        let _ = writeln!(out, "{}", add_outcome(doc));
    }
    let _ = write!(
        out,
        "📊 {}: {} added, {} failed, {} chunks",
        report.root.display(),
        report.succeeded(),
        report.failed(),
        report.chunks_created()
    );
    out
}

pub fn query_outcome(outcome: &QueryOutcome) -> String {
    match outcome {
        QueryOutcome::Success(answer) => {
            let mut out = format!("\n💡 Answer:\n{}\n", answer.answer);
            for (i, (text, score)) in answer.context_documents.iter().zip(&answer.similarity_scores).enumerate() {
                let source = answer
                    .metadata
                    .get(i)
                    .and_then(|m| m.get("source"))
                    .and_then(|s| s.as_str())
                    .unwrap_or("?");
                let _ = write!(out, "\n  {}. score={:.4}  {}\n     {}", i + 1, score, source, snippet(text, 160));
            }
            let _ = write!(
                out,
                "\n\n📊 context documents: {}\n📏 context length: {} chars",
                answer.context_documents.len(),
                answer.context_length
            );
            out
        }
        QueryOutcome::Error { error, .. } => format!("❌ Query failed: {}", error),
    }
}

pub fn stats(stats: &SystemStats) -> String {
    let store = &stats.vector_store;
    let mut out = format!(
        "📈 System stats:\n   - total documents: {}\n   - index size: {}\n   - chunk size: {}\n   - chunk overlap: {}\n   - db path: {}",
        store.total_documents,
        store.index_size,
        stats.chunk_size,
        stats.chunk_overlap,
        store.db_path.display()
    );
    if !store.is_consistent() {
        out.push_str("\n⚠️  index and document store disagree; the last write may have been interrupted");
    }
    out
}

fn snippet(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        format!("{}…", flat.chars().take(max_chars).collect::<String>())
    }
}
