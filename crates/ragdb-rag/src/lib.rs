//! ragdb-rag
//!
//! Ingestion and question answering on top of the retrieval engine.

pub mod generate;
pub mod outcome;
pub mod prompt;
pub mod system;

pub use generate::{generator_from_settings, ChatCompletionsGenerator, ContextOnlyGenerator};
pub use outcome::{AddDocumentOutcome, Answer, DirectoryReport, DocumentAdded, QueryOutcome, SystemStats};
pub use prompt::build_prompt;
pub use system::RagSystem;
