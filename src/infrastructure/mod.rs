//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod storage;

pub use database::{init_database, DatabaseConfig, RevokedTokenRepository, UserRepository};
pub use storage::InMemoryCredentialStore;
