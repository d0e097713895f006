use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

/// Checks `sha256=<hex>` HMAC signatures over raw request bodies
pub struct HmacValidator {
    secret: String,
    header_name: String,
}

impl HmacValidator {
    pub fn new(secret: String, header_name: String) -> Self {
        Self { secret, header_name }
    }

    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    /// Hex HMAC-SHA256 of `body`
    pub fn sign(&self, body: &[u8]) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| AppError::Config("Invalid HMAC secret".to_string()))?;

        mac.update(body);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    pub fn validate(&self, body: &[u8], signature_header: &str) -> Result<()> {
        let expected = signature_header
            .trim()
            .strip_prefix(SIGNATURE_PREFIX)
            .ok_or_else(|| {
                tracing::warn!("Invalid signature format in header {}", self.header_name);
                AppError::InvalidSignatureFormat
            })?;

        let computed = self.sign(body)?;
        tracing::debug!("Validating signature over {} bytes", body.len());

        let matches: bool = computed.as_bytes()
            .ct_eq(expected.to_ascii_lowercase().as_bytes())
            .into();

        if matches {
            Ok(())
        } else {
            tracing::warn!("Signature mismatch on header {}", self.header_name);
            Err(AppError::HmacValidation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> HmacValidator {
        HmacValidator::new("test_secret".to_string(), "X-Hub-Signature".to_string())
    }

    #[test]
    fn test_hmac_validation_success() {
        let body = b"{\"status\":\"200\"}";

        let mut mac = HmacSha256::new_from_slice(b"test_secret").unwrap();
        mac.update(body);
        let expected = hex::encode(mac.finalize().into_bytes());

        assert_eq!(validator().sign(body).unwrap(), expected);
        assert!(validator().validate(body, &format!("sha256={}", expected)).is_ok());
        assert!(validator().validate(body, &format!("sha256={}", expected.to_uppercase())).is_ok());
    }

    #[test]
    fn test_hmac_validation_failure() {
        let result = validator().validate(b"test body", "sha256=wrongsignature");
        assert!(matches!(result, Err(AppError::HmacValidation)));
    }

    #[test]
    fn test_missing_prefix_is_a_format_error() {
        let signature = validator().sign(b"test body").unwrap();
        let result = validator().validate(b"test body", &signature);
        assert!(matches!(result, Err(AppError::InvalidSignatureFormat)));
    }
}
