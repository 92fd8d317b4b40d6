//! Domain entities representing core business objects.

pub mod user;
pub mod verification_record;

// Re-export commonly used types
pub use user::{NewUser, User};
pub use verification_record::{
    Purpose, SecretKind, VerificationRecord, NUMERIC_CODE_LENGTH, TOKEN_MIN_LENGTH,
};
