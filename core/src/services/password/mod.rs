//! Password policy and hashing used by the reset and registration flows

mod hasher;
mod policy;

pub use hasher::PasswordHasher;
pub use policy::{DefaultPasswordPolicy, PasswordPolicy, MIN_PASSWORD_LENGTH};
