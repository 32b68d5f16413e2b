//! Recursive, overlap-aware text splitting.
//!
//! Text is split on the coarsest separator it contains (paragraph, line, word,
//! character); pieces that are still too long are split again with the next
//! separator. Adjacent pieces are then merged back into chunks of at most
//! `chunk_size` estimated tokens, each chunk starting with up to
//! `chunk_overlap` tokens taken from the end of the previous one.

use serde_json::Value;
use std::collections::VecDeque;

use crate::config::ChunkingSettings;
use crate::error::{Error, Result};
use crate::types::{Chunk, Metadata};

const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Estimated token count: ~0.75 words per token, rounded up.
///
/// Rounding up keeps the estimate subadditive, so a chunk never measures more
/// than the sum of the pieces it was merged from.
pub fn count_tokens(text: &str) -> usize {
    let words = text.split_whitespace().count();
    (words * 4).div_ceil(3)
}

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be positive".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    pub fn from_settings(settings: &ChunkingSettings) -> Result<Self> {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize { self.chunk_size }

    pub fn chunk_overlap(&self) -> usize { self.chunk_overlap }

    /// Split `text` into trimmed, non-empty chunk strings.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &SEPARATORS)
    }

    /// Split `text` into chunks that each carry a copy of the document metadata
    /// plus their position (`chunk_index`, `total_chunks`).
    pub fn split(&self, text: &str, metadata: &Metadata) -> Vec<Chunk> {
        let pieces = self.split_text(text);
        let total = pieces.len();
        let chunks: Vec<Chunk> = pieces
            .into_iter()
            .enumerate()
            .map(|(i, piece)| {
                let mut meta = metadata.clone();
                meta.insert("chunk_index".to_string(), Value::from(i));
                meta.insert("total_chunks".to_string(), Value::from(total));
                Chunk::new(piece, meta)
            })
            .collect();
        tracing::debug!(chunks = chunks.len(), "text split");
        chunks
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let idx = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(idx).copied().unwrap_or("");
        let finer = separators.get(idx + 1..).unwrap_or(&[]);

        let mut chunks = Vec::new();
        let mut good: Vec<&str> = Vec::new();
        for piece in split_keep_separator(text, separator) {
            if count_tokens(piece) < self.chunk_size {
                good.push(piece);
                continue;
            }
            if !good.is_empty() {
                chunks.extend(self.merge(&good));
                good.clear();
            }
            if finer.is_empty() {
                if let Some(piece) = trimmed(piece) { chunks.push(piece); }
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }
        if !good.is_empty() {
            chunks.extend(self.merge(&good));
        }
        chunks
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;
        for &piece in pieces {
            let len = count_tokens(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                if let Some(chunk) = join(&window) { chunks.push(chunk); }
                // Keep at most `chunk_overlap` tokens, and always leave room for `piece`.
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }
            window.push_back((piece, len));
            total += len;
        }
        if let Some(chunk) = join(&window) { chunks.push(chunk); }
        chunks
    }
}

/// Split on `separator`, keeping it at the start of the following piece so
/// that concatenating the pieces reproduces `text`. Empty pieces are dropped.
fn split_keep_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]).collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn join(window: &VecDeque<(&str, usize)>) -> Option<String> {
    let joined: String = window.iter().map(|(p, _)| *p).collect();
    trimmed(&joined)
}

fn trimmed(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}
