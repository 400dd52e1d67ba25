//! Encrypted API keys for programmatic clients.
//!
//! An API key is a self-contained, self-expiring claim set sealed with the
//! process-wide encryption key. There is no revocation list: expiry is
//! checked against wall-clock time on every request.

use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::cipher;
use crate::domain::ResolvedIdentity;
use crate::error::{AuthError, AuthResult};

/// Claims carried inside an encrypted API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyPayload {
    pub client_id: i64,
    pub user_id: i64,
    pub role_id: i64,
    /// Expiry as a Unix timestamp in seconds.
    pub expiry: i64,
    /// Modules the key may access. Absent and `null` both mean none.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub permissions: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ApiKeyPayload {
    /// Decrypt and parse an API key.
    ///
    /// JSON parsing is the only integrity check the wire format offers, so a
    /// tampered key surfaces as [`AuthError::MalformedPayload`] at best.
    pub fn open(key_hex: &str, token: &str) -> AuthResult<Self> {
        let plaintext = cipher::decrypt(key_hex, token)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }

    /// Serialise and encrypt into the `api-key` header format.
    pub fn seal(&self, key_hex: &str) -> AuthResult<String> {
        let plaintext = serde_json::to_vec(self)?;
        Ok(cipher::encrypt(key_hex, &plaintext)?)
    }

    /// Reject the key if `now` is past its expiry.
    pub fn check_expiry(&self, now: i64) -> AuthResult<()> {
        if self.expiry < now {
            return Err(AuthError::TokenExpired {
                expiry: self.expiry,
            });
        }
        Ok(())
    }

    /// Exact, case-sensitive module membership.
    pub fn grants_module(&self, module: &str) -> bool {
        self.permissions.iter().any(|m| m == module)
    }

    pub fn identity(&self) -> ResolvedIdentity {
        ResolvedIdentity::new(self.client_id, self.user_id, self.role_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE, Engine as _};

    const KEY: &str = "e05b0e0d42c608dd08151cfc325da68f1eadd7bf60e457a043bc2e1de39635e2";

    fn payload(expiry: i64) -> ApiKeyPayload {
        ApiKeyPayload {
            client_id: 5,
            user_id: 2,
            role_id: 0,
            expiry,
            permissions: vec![
                "USER".to_string(),
                "SMS".to_string(),
                "SETTINGS".to_string(),
            ],
        }
    }

    #[test]
    fn test_seal_and_open() {
        let sealed = payload(1_900_000_000);
        let token = sealed.seal(KEY).unwrap();

        let opened = ApiKeyPayload::open(KEY, &token).unwrap();
        assert_eq!(opened, sealed);
        assert_eq!(opened.identity(), ResolvedIdentity::new(5, 2, 0));
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(payload(10)).unwrap();
        for field in ["client_id", "user_id", "role_id", "expiry", "permissions"] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
    }

    #[test]
    fn test_missing_permissions_defaults_to_empty() {
        let token = cipher::encrypt(
            KEY,
            br#"{"client_id":1,"user_id":1,"role_id":1,"expiry":99}"#,
        )
        .unwrap();

        let opened = ApiKeyPayload::open(KEY, &token).unwrap();
        assert!(opened.permissions.is_empty());
    }

    #[test]
    fn test_null_permissions_is_empty() {
        let token = cipher::encrypt(
            KEY,
            br#"{"client_id":5,"user_id":2,"role_id":0,"expiry":99,"permissions":null}"#,
        )
        .unwrap();

        let opened = ApiKeyPayload::open(KEY, &token).unwrap();
        assert!(opened.permissions.is_empty());
        assert!(!opened.grants_module("USER"));
    }

    #[test]
    fn test_expiry_boundary() {
        let key = payload(1000);
        assert!(key.check_expiry(999).is_ok());
        assert!(key.check_expiry(1000).is_ok());
        assert!(matches!(
            key.check_expiry(1001),
            Err(AuthError::TokenExpired { expiry: 1000 })
        ));
    }

    #[test]
    fn test_module_membership_is_exact() {
        let key = payload(0);
        assert!(key.grants_module("USER"));
        assert!(!key.grants_module("user"));
        assert!(!key.grants_module("CONFIG"));
    }

    #[test]
    fn test_garbage_plaintext_is_malformed() {
        let token = cipher::encrypt(KEY, b"not json at all").unwrap();
        assert!(matches!(
            ApiKeyPayload::open(KEY, &token),
            Err(AuthError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_wrong_key_is_malformed() {
        let token = payload(10).seal(KEY).unwrap();
        let other = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

        assert!(matches!(
            ApiKeyPayload::open(other, &token),
            Err(AuthError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_short_token_fails_decryption() {
        let token = URL_SAFE.encode(b"short");
        assert!(matches!(
            ApiKeyPayload::open(KEY, &token),
            Err(AuthError::DecryptionFailed(cipher::CipherError::CiphertextTooShort))
        ));
    }
}
