pub mod identity;
pub mod session;

pub use identity::{AuthService, AuthSettings, CredentialService};
pub use session::{
    start_revocation_sweeper, RevocationRegistry, SharedRevocationRegistry, TokenIssuer,
    TokenValidator,
};
