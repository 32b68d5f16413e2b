//! ragdb-core
//!
//! Shared vocabulary of the workspace: domain types, the error taxonomy, the
//! collaborator traits, configuration, text extraction and chunking.

pub mod chunker;
pub mod config;
pub mod error;
pub mod extract;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use types::{Chunk, ChunkRecord, Metadata, SearchResults, StoreStats};
