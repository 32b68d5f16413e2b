//! ragdb-vector
//!
//! The retrieval engine: an exact inner-product index kept positionally
//! aligned with a document store, and the on-disk format both are saved in.

pub mod engine;
pub mod index;
pub mod persist;
pub mod store;

pub use engine::{EngineConfig, RetrievalEngine};
pub use index::{FlatIndex, Metric};
pub use store::DocumentStore;
