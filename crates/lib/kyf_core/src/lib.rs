//! # kyf_core
//!
//! Core domain logic for FURIA KYF: credentials and sessions, the relational
//! store, on-disk uploads, outgoing mail and the document vision check.

pub mod auth;
pub mod documents;
pub mod esports;
pub mod forms;
pub mod mail;
pub mod migrate;
pub mod models;
pub mod social;
pub mod storage;
pub mod vision;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
