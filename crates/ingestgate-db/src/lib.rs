//! §4.12 Persistence Layer: a single Postgres pool, versioned migrations,
//! and the repositories that sit on top of it.

pub mod config;
pub mod migrations;
pub mod pool;
pub mod repo;

pub use config::DbConfig;
pub use migrations::run_migrations;
pub use pool::connect;
pub use repo::intelligence::IntelligenceRepository;
pub use repo::personas::PersonaRepository;
pub use repo::upload_jobs::UploadJobRepository;
