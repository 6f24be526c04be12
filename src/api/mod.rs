//! Library entry points: the boundary contracts a thin transport layer
//! (HTTP routes, serverless handlers) calls into.

pub mod repos;
pub mod timeline;

pub use repos::{register_repository, repository_status, spawn_ingestion, IngestionHandle};
pub use timeline::{remote_timeline, structural_timeline};
