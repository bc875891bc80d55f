//! SQLite persistence: schema bootstrap, pragma setup, and the repository
//! for portfolio documents and profile records.

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::{ProfileRecord, Repository};
