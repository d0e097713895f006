use serde::{Deserialize, Serialize};
use crate::error::{AppError, Result};
use std::fmt;
use std::fs;

#[derive(Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SecretSource {
    Plain(String),
    FromEnv {
        #[serde(rename = "fromEnv")]
        from_env: String
    },
    FromFile {
        #[serde(rename = "fromFile")]
        from_file: String
    },
}

impl SecretSource {
    pub fn resolve(&self) -> Result<String> {
        let value = match self {
            SecretSource::Plain(value) => value.clone(),
            SecretSource::FromEnv { from_env } => std::env::var(from_env)
                .map_err(|_| AppError::SecretNotFound(from_env.clone()))?,
            SecretSource::FromFile { from_file } => fs::read_to_string(from_file)
                .map(|s| s.trim().to_string())
                .map_err(|_| AppError::SecretNotFound(from_file.clone()))?,
        };

        if value.is_empty() {
            return Err(AppError::Config("Secret resolved to an empty value".to_string()));
        }

        Ok(value)
    }
}

// Keeps plain secrets out of logged configuration
impl fmt::Debug for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretSource::Plain(_) => f.write_str("Plain(***)"),
            SecretSource::FromEnv { from_env } => f.debug_struct("FromEnv").field("from_env", from_env).finish(),
            SecretSource::FromFile { from_file } => f.debug_struct("FromFile").field("from_file", from_file).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_secret() {
        let secret: SecretSource = serde_json::from_value(json!("s3cret")).unwrap();
        assert_eq!(secret.resolve().unwrap(), "s3cret");
        assert_eq!(format!("{:?}", secret), "Plain(***)");
    }

    #[test]
    fn test_missing_env_secret() {
        let secret: SecretSource = serde_json::from_value(json!({"fromEnv": "PRUNEGATE_TEST_UNSET_SECRET"})).unwrap();
        assert!(matches!(secret.resolve(), Err(AppError::SecretNotFound(name)) if name == "PRUNEGATE_TEST_UNSET_SECRET"));
    }

    #[test]
    fn test_empty_plain_secret_is_rejected() {
        assert!(SecretSource::Plain(String::new()).resolve().is_err());
    }
}
