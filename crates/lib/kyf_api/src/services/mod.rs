//! Request-independent service layer.

pub mod auth;
pub mod cookies;
pub mod documents;
pub mod upload;
