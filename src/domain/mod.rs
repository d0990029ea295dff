pub mod session;
pub mod user;

pub use session::{Identity, RevocationEntry, RevocationStore, SessionToken};
pub use user::{
    CredentialStore, PasswordHash, ProfileUpdate, PublicProfile, UserChanges, UserRecord,
    UserRole,
};

pub use crate::shared::errors::{AuthError, AuthResult};
