//! # Auth Service
//!
//! Session authentication engine: password credentials, signed expiring
//! session tokens and revocation, exposed over a small REST API.
//!
//! ## Architecture
//!
//! - **domain**: users, sessions, identities and the credential store port
//! - **application**: credential, token and revocation logic behind
//!   [`AuthService`]
//! - **infrastructure**: bcrypt/JWT crypto, in-memory and SQLite stores
//! - **interfaces**: axum router, session guard, Swagger documentation
//! - **shared**: errors, clock, shutdown coordination

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use application::{AuthService, AuthSettings};
pub use config::{default_config_path, AppConfig, StorageBackend};
pub use domain::{AuthError, AuthResult};
pub use infrastructure::{
    init_database, DatabaseConfig, InMemoryCredentialStore, RevokedTokenRepository, UserRepository,
};
pub use interfaces::http::create_api_router;
