//! Domain models shared by the store queries and the API layer.

pub mod auth;
pub mod profile;
