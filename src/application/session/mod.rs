//! Session lifecycle: issuing, validating and revoking tokens

pub mod issuer;
pub mod revocation;
pub mod sweeper;
pub mod validator;

pub use issuer::TokenIssuer;
pub use revocation::{RevocationRegistry, SharedRevocationRegistry};
pub use sweeper::start_revocation_sweeper;
pub use validator::TokenValidator;
