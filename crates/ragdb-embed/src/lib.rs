//! ragdb-embed
//!
//! Embedding providers: a dependency-free hashing embedder, a local BGE-M3
//! model run through candle, and a client for OpenAI-compatible servers.

use anyhow::Result;

use ragdb_core::config::{EmbeddingProvider, EmbeddingSettings};
use ragdb_core::traits::Embedder;

pub mod device;
pub mod hashing;
pub mod model;
pub mod pool;
pub mod remote;
pub mod tokenize;

pub use hashing::HashingEmbedder;
pub use model::BgeM3Embedder;
pub use pool::masked_mean_l2;
pub use remote::RemoteEmbedder;

/// Build the embedder selected in settings. `dimension` is the store's
/// configured dimension; the hashing and remote embedders produce vectors of
/// that size, the local model reports its own.
pub fn embedder_from_settings(settings: &EmbeddingSettings, dimension: usize) -> Result<Box<dyn Embedder>> {
    let embedder: Box<dyn Embedder> = match settings.provider {
        EmbeddingProvider::Hashing => Box::new(HashingEmbedder::new(dimension)),
        EmbeddingProvider::Local => Box::new(BgeM3Embedder::from_settings(settings)?),
        EmbeddingProvider::Remote => Box::new(RemoteEmbedder::from_settings(settings, dimension)?),
    };
    tracing::info!(provider = ?settings.provider, dim = embedder.dim(), "embedder ready");
    Ok(embedder)
}
