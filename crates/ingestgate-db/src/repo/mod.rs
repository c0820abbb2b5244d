pub mod intelligence;
pub mod personas;
pub mod upload_jobs;
