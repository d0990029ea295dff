//! Identity module: credentials and the authentication service
//!
//! `CredentialService` owns the password side (register, verify, update,
//! delete); `AuthService` combines it with the session components into the
//! request contract the HTTP layer calls.

pub mod credentials;
pub mod rules;
pub mod service;

pub use credentials::CredentialService;
pub use service::{AuthService, AuthSettings};
