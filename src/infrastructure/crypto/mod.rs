//! Cryptographic primitives: password hashing and token signing.

pub mod jwt;
pub mod password;

pub use jwt::{decode_token, encode_token, JwtConfig, TokenClaims};
pub use password::{hash_password, hash_password_blocking, verify_password, verify_password_blocking};
