//! Text extraction from source files.
//!
//! Plain text is read as UTF-8 with a lossy fallback. PDFs are extracted page
//! by page; every page produces a [`PageOutcome`] so that pages without text
//! (scans, broken content streams) are reported rather than dropped silently.

use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::Metadata;

/// Extensions accepted by [`extract_text`] and [`list_documents`].
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "pdf"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PageOutcome {
    Extracted { page: u32, chars: usize },
    Skipped { page: u32, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub pages: Vec<PageOutcome>,
}

impl ExtractionReport {
    pub fn extracted(&self) -> usize {
        self.pages.iter().filter(|p| matches!(p, PageOutcome::Extracted { .. })).count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (u32, &str)> {
        self.pages.iter().filter_map(|p| match p {
            PageOutcome::Skipped { page, reason } => Some((*page, reason.as_str())),
            PageOutcome::Extracted { .. } => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    pub report: ExtractionReport,
}

/// Lower-cased extension of `path`, or an empty string when it has none.
pub fn file_type(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

pub fn is_supported(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&file_type(path).as_str())
}

pub fn extract_text(path: &Path) -> Result<Extraction> {
    match file_type(path).as_str() {
        "pdf" => extract_pdf(path),
        "txt" | "md" => extract_plain(path),
        other => Err(Error::extraction(path, format!("unsupported file type: '{}'", other))),
    }
}

fn extract_plain(path: &Path) -> Result<Extraction> {
    let bytes = fs::read(path).map_err(|e| Error::extraction(path, e))?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), "file is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    debug!(path = %path.display(), chars = text.chars().count(), "text file read");
    Ok(Extraction { text, report: ExtractionReport::default() })
}

fn extract_pdf(path: &Path) -> Result<Extraction> {
    let doc = lopdf::Document::load(path).map_err(|e| Error::extraction(path, e))?;
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    info!(path = %path.display(), pages = page_numbers.len(), "extracting pdf");

    let mut text = String::new();
    let mut report = ExtractionReport::default();
    for page in page_numbers {
        match doc.extract_text(&[page]) {
            Ok(page_text) if !page_text.trim().is_empty() => {
                let chars = page_text.chars().count();
                text.push_str(&format!("\n--- Page {} ---\n{}\n", page, page_text));
                report.pages.push(PageOutcome::Extracted { page, chars });
            }
            Ok(_) => {
                warn!(page, "page has no extractable text");
                report.pages.push(PageOutcome::Skipped { page, reason: "no extractable text".to_string() });
            }
            Err(e) => {
                warn!(page, error = %e, "page extraction failed");
                report.pages.push(PageOutcome::Skipped { page, reason: e.to_string() });
            }
        }
    }
    info!(
        path = %path.display(),
        extracted = report.extracted(),
        skipped = report.pages.len() - report.extracted(),
        chars = text.chars().count(),
        "pdf extraction finished"
    );
    Ok(Extraction { text, report })
}

/// Document-level metadata copied onto every chunk of the document.
pub fn document_metadata(path: &Path, text: &str) -> Metadata {
    let mut meta = Metadata::new();
    meta.insert("source".to_string(), Value::from(path.to_string_lossy().into_owned()));
    meta.insert("file_type".to_string(), Value::from(file_type(path)));
    meta.insert("text_length".to_string(), Value::from(text.chars().count()));
    meta
}

/// Every supported file under `root`, sorted by path.
pub fn list_documents(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_supported(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}
