//! §6.1 HTTP surface, one module per endpoint group.

pub mod batch;
pub mod demo;
pub mod listen;
pub mod text;
pub mod upload;
