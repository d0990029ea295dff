//! Authentication module: login, logout, register, profile, deletion

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
