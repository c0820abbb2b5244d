//! §4.6 Intelligence Extractor & Persister: one structured-output LLM
//! call decomposed into the fixed summary/insight row shapes and
//! committed in a single transaction.

pub mod extractor;
pub mod persister;
pub mod prompt;
pub mod schema;

pub use extractor::IntelligenceExtractor;
pub use persister::IntelligencePersister;
