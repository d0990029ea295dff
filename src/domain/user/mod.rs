//! User aggregate
//!
//! Contains the credential record, update DTOs, and the store interface.

pub mod model;
pub mod repository;

mod dto_update;

pub use model::{PasswordHash, PublicProfile, UserRecord, UserRole};

pub use dto_update::{ProfileUpdate, UserChanges};

pub use repository::CredentialStore;
