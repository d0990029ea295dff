//! Credential store implementations that live in process memory

mod memory;
#[cfg(test)]
mod unavailable;

pub use memory::InMemoryCredentialStore;
#[cfg(test)]
pub(crate) use unavailable::UnavailableCredentialStore;
