//! Per-request credentials.
//!
//! Credentials are explicit values built from the request's typed parameters
//! and threaded through target resolution. Nothing here mutates global
//! state, so concurrent jobs for different accounts cannot interfere; every
//! job rebuilds its credentials from its own parameters.

use skinfaxi_types::TypedParams;

use crate::error::{HalError, HalResult};

/// Credential material for a provider.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Provider requires no authentication (local simulators).
    None,
    /// Single API token.
    Token {
        /// The token value.
        token: String,
    },
    /// Access-key pair plus region (AWS-style providers).
    AccessKeys {
        /// Access key id.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Provider region.
        region: String,
    },
}

impl Credentials {
    /// Build token credentials from typed parameters.
    ///
    /// Reads the `token` field, case-insensitively.
    pub fn token_from_params(provider: &str, params: &TypedParams) -> HalResult<Self> {
        let token = params
            .get_str("token")
            .ok_or_else(|| HalError::MissingCredential {
                provider: provider.to_string(),
                field: "token".to_string(),
            })?;
        Ok(Credentials::Token {
            token: token.to_string(),
        })
    }

    /// Build access-key credentials from typed parameters.
    ///
    /// Reads `aws-access-key-id` and `aws-secret-access-key`; `region`
    /// falls back to `default_region` when absent.
    pub fn access_keys_from_params(
        provider: &str,
        params: &TypedParams,
        default_region: &str,
    ) -> HalResult<Self> {
        let missing = |field: &str| HalError::MissingCredential {
            provider: provider.to_string(),
            field: field.to_string(),
        };
        let access_key_id = params
            .get_str("aws-access-key-id")
            .ok_or_else(|| missing("aws-access-key-id"))?;
        let secret_access_key = params
            .get_str("aws-secret-access-key")
            .ok_or_else(|| missing("aws-secret-access-key"))?;
        let region = params.get_str("region").unwrap_or(default_region);

        Ok(Credentials::AccessKeys {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
            region: region.to_string(),
        })
    }

    /// The bearer token, if these are token credentials.
    pub fn bearer_token(&self) -> Option<&str> {
        match self {
            Credentials::Token { token } => Some(token),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::None => write!(f, "Credentials::None"),
            Credentials::Token { .. } => f
                .debug_struct("Credentials::Token")
                .field("token", &"[REDACTED]")
                .finish(),
            Credentials::AccessKeys { region, .. } => f
                .debug_struct("Credentials::AccessKeys")
                .field("access_key_id", &"[REDACTED]")
                .field("secret_access_key", &"[REDACTED]")
                .field("region", region)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_from_params() {
        let params = TypedParams::from_raw(&json!({
            "Token": { "rawValue": "secret", "type": "Unknown" }
        }));
        let creds = Credentials::token_from_params("ionq", &params).unwrap();
        assert_eq!(creds.bearer_token(), Some("secret"));
    }

    #[test]
    fn test_missing_token() {
        let err = Credentials::token_from_params("ionq", &TypedParams::new()).unwrap_err();
        assert!(matches!(
            err,
            HalError::MissingCredential { ref field, .. } if field == "token"
        ));
    }

    #[test]
    fn test_access_keys_with_default_region() {
        let params = TypedParams::from_raw(&json!({
            "aws-access-key-id": { "rawValue": "AKIA", "type": "String" },
            "aws-secret-access-key": { "rawValue": "shh", "type": "String" }
        }));
        let creds =
            Credentials::access_keys_from_params("braket", &params, "eu-west-2").unwrap();
        assert_eq!(
            creds,
            Credentials::AccessKeys {
                access_key_id: "AKIA".into(),
                secret_access_key: "shh".into(),
                region: "eu-west-2".into(),
            }
        );
    }

    #[test]
    fn test_access_keys_missing_secret() {
        let params = TypedParams::from_raw(&json!({
            "aws-access-key-id": { "rawValue": "AKIA", "type": "String" }
        }));
        let err =
            Credentials::access_keys_from_params("braket", &params, "eu-west-2").unwrap_err();
        assert!(matches!(
            err,
            HalError::MissingCredential { ref field, .. } if field == "aws-secret-access-key"
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::Token {
            token: "super-secret".into(),
        };
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
