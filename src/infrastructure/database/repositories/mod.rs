//! Database repository implementations

pub mod revoked_token_repository;
pub mod user_repository;

pub use revoked_token_repository::RevokedTokenRepository;
pub use user_repository::UserRepository;
