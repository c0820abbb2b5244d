//! Structured-output LLM client shared by `ingestgate-cleaner` and
//! `ingestgate-intelligence`. Both need "call with a JSON-schema-constrained
//! prompt, retry a bounded number of times on a malformed response" — this
//! crate is that behavior, factored out once instead of twice.

pub mod client;
pub mod openai;

pub use openai::{OpenAiClient, OpenAiConfig};
