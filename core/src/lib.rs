//! # Keygate Core
//!
//! Domain layer for the Keygate account services.
//! This crate contains the verification record entity, the issuance and
//! confirmation flows built on it, repository interfaces with in-memory
//! implementations, and the error types shared by all of them.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
