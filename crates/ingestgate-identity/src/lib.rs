//! §4.1 Identity & Context Resolver.
//!
//! - [`config`]: `IdentityConfig`, the §6.6 options this resolver consumes
//! - [`token`]: HMAC-SHA256 signed-token decode/verify
//! - [`resolver`]: header → `RequestContext` resolution, both auth modes
//! - [`extractor`]: the axum extractor handlers use instead of re-parsing
//!   headers per route

pub mod config;
pub mod extractor;
pub mod resolver;
pub mod token;

pub use config::IdentityConfig;
pub use extractor::{IdentityRejection, RequestContextExtractor};
pub use resolver::resolve_context;
