//! Database entities module

pub mod revoked_token;
pub mod user;

pub use revoked_token::Entity as RevokedToken;
pub use user::Entity as User;
