//! Request handlers.

pub mod documents;
pub mod esports;
pub mod health;
pub mod social;
pub mod user;
