//! Verification code lifecycle for email verification and password reset
//!
//! This module provides:
//! - Secret generation from the OS random source
//! - Issuance with per-email quotas and supersession of reset codes
//! - Confirmation with single-use consumption through a conditional update
//! - The account flows (registration, verification, reset, sign-in) on top

mod code_generator;
mod config;
mod confirmation;
mod deps;
mod issuance;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use code_generator::{format_numeric_code, CodeGenerator, TOKEN_BYTES};
pub use config::VerificationServiceConfig;
pub use confirmation::ConfirmationFlow;
pub use deps::ServiceDependencies;
pub use issuance::IssuancePolicy;
pub use service::VerificationService;
pub use types::{ConfirmationEffect, ConfirmationKey, ConfirmationReceipt, IssueAcknowledgement};
