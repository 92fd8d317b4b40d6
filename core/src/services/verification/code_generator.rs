//! Random one-time codes and link tokens from the OS CSPRNG

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};

use crate::domain::entities::verification_record::SecretKind;
use crate::errors::{DomainError, DomainResult};

/// Number of distinct numeric codes
const CODE_SPACE: u32 = 1_000_000;

/// Largest multiple of `CODE_SPACE` that fits in a u32; draws at or above it
/// are rejected so that `draw % CODE_SPACE` stays uniform
const ACCEPT_BELOW: u32 = u32::MAX - (u32::MAX % CODE_SPACE);

/// Random bytes behind a link token
pub const TOKEN_BYTES: usize = 32;

/// Zero-padded six digit rendering of a code value
pub fn format_numeric_code(value: u32) -> String {
    format!("{:06}", value % CODE_SPACE)
}

/// Generates secrets; the only consumer of the secure random source
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeGenerator;

impl CodeGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Six ASCII digits, uniform over 000000..=999999
    pub fn generate_numeric_code(&self) -> DomainResult<String> {
        loop {
            let mut buf = [0u8; 4];
            fill_random(&mut buf)?;
            let draw = u32::from_le_bytes(buf);
            if draw < ACCEPT_BELOW {
                return Ok(format_numeric_code(draw));
            }
        }
    }

    /// 32 random bytes as unpadded base64url (43 characters)
    pub fn generate_token(&self) -> DomainResult<String> {
        let mut buf = [0u8; TOKEN_BYTES];
        fill_random(&mut buf)?;
        Ok(URL_SAFE_NO_PAD.encode(buf))
    }

    /// Secret of the given kind
    pub fn generate(&self, kind: SecretKind) -> DomainResult<String> {
        match kind {
            SecretKind::NumericCode => self.generate_numeric_code(),
            SecretKind::UrlToken => self.generate_token(),
        }
    }
}

fn fill_random(buf: &mut [u8]) -> DomainResult<()> {
    OsRng.try_fill_bytes(buf).map_err(|e| {
        tracing::error!(error = %e, event = "random_source_failed", "OS random source unavailable");
        DomainError::internal(format!("secure random source unavailable: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::verification_record::TOKEN_MIN_LENGTH;
    use std::collections::HashSet;

    #[test]
    fn test_numeric_code_shape() {
        let generator = CodeGenerator::new();
        for _ in 0..1000 {
            let code = generator.generate_numeric_code().unwrap();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
            assert!(SecretKind::NumericCode.is_well_formed(&code));
        }
    }

    #[test]
    fn test_zero_padding() {
        assert_eq!(format_numeric_code(0), "000000");
        assert_eq!(format_numeric_code(42), "000042");
        assert_eq!(format_numeric_code(999_999), "999999");
    }

    #[test]
    fn test_rejection_bound_is_multiple_of_code_space() {
        assert_eq!(ACCEPT_BELOW % CODE_SPACE, 0);
        assert!(u32::MAX - ACCEPT_BELOW < CODE_SPACE);
    }

    #[test]
    fn test_token_shape() {
        let generator = CodeGenerator::new();
        let token = generator.generate_token().unwrap();

        assert_eq!(token.len(), TOKEN_MIN_LENGTH);
        assert!(!token.contains('='));
        assert!(SecretKind::UrlToken.is_well_formed(&token));
        assert_eq!(URL_SAFE_NO_PAD.decode(&token).unwrap().len(), TOKEN_BYTES);
    }

    #[test]
    fn test_tokens_are_distinct() {
        let generator = CodeGenerator::new();
        let tokens: HashSet<String> = (0..200).map(|_| generator.generate_token().unwrap()).collect();
        assert_eq!(tokens.len(), 200);
    }

    #[test]
    fn test_generate_by_kind() {
        let generator = CodeGenerator::new();
        assert_eq!(generator.generate(SecretKind::NumericCode).unwrap().len(), 6);
        assert_eq!(generator.generate(SecretKind::UrlToken).unwrap().len(), 43);
    }
}
