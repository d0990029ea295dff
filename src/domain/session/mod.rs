//! Session aggregate: issued tokens, validated identities, revocations.

pub mod model;
pub mod repository;

pub use model::{Identity, RevocationEntry, SessionToken};
pub use repository::RevocationStore;
