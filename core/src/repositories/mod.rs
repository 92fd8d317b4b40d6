//! Repository interfaces for users and verification records.

pub mod user;
pub mod verification;

pub use user::UserRepository;
pub use verification::{SupersedeOutcome, VerificationRepository};

/// In-memory implementations for development and tests
///
/// Each repository keeps its state behind a single lock, so the atomicity
/// contracts of the traits hold the same way they do in the SQL store.
pub mod memory {
    pub use super::user::InMemoryUserRepository;
    pub use super::verification::InMemoryVerificationRepository;
}
