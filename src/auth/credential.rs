//! Credential extraction from request headers.

use std::fmt;

use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};

/// Header carrying the shared service secret.
pub const SERVICE_TOKEN_HEADER: &str = "x-token";
/// Header carrying an encrypted API key.
pub const API_KEY_HEADER: &str = "api-key";
/// Optional client override for service callers.
pub const CLIENT_ID_HEADER: &str = "x-client-id";
/// Optional user override for service callers.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Credential family, inferred from the header that carried it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    ServiceSharedSecret,
    BearerToken,
    EncryptedApiKey,
    Unknown,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::ServiceSharedSecret => write!(f, "service_shared_secret"),
            Scheme::BearerToken => write!(f, "bearer_token"),
            Scheme::EncryptedApiKey => write!(f, "encrypted_api_key"),
            Scheme::Unknown => write!(f, "unknown"),
        }
    }
}

/// A credential presented on a request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    ServiceSharedSecret(String),
    BearerToken(String),
    EncryptedApiKey(String),
    Unknown,
}

impl Credential {
    /// Classify the credential on a request.
    ///
    /// Headers are checked in priority order `Authorization`, `x-token`,
    /// `api-key`. A request carrying several is resolved by that order, not
    /// rejected. Only presence is checked here: a non-empty value classifies
    /// the request even when its bytes are not valid UTF-8, and validation
    /// rejects it later.
    pub fn extract(headers: &HeaderMap) -> Self {
        if let Some(token) = present(headers, AUTHORIZATION.as_str()) {
            return Credential::BearerToken(lossy(token));
        }

        if let Some(token) = present(headers, SERVICE_TOKEN_HEADER) {
            return Credential::ServiceSharedSecret(lossy(token));
        }

        if let Some(token) = present(headers, API_KEY_HEADER) {
            return Credential::EncryptedApiKey(lossy(token));
        }

        Credential::Unknown
    }

    pub fn scheme(&self) -> Scheme {
        match self {
            Credential::ServiceSharedSecret(_) => Scheme::ServiceSharedSecret,
            Credential::BearerToken(_) => Scheme::BearerToken,
            Credential::EncryptedApiKey(_) => Scheme::EncryptedApiKey,
            Credential::Unknown => Scheme::Unknown,
        }
    }

    /// The raw credential string; empty for [`Credential::Unknown`].
    pub fn value(&self) -> &str {
        match self {
            Credential::ServiceSharedSecret(v)
            | Credential::BearerToken(v)
            | Credential::EncryptedApiKey(v) => v,
            Credential::Unknown => "",
        }
    }

    /// Short, log-safe prefix of the credential.
    pub fn redacted(&self) -> &str {
        redact(self.value())
    }
}

// Secrets stay out of debug output.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({}, {}..)", self.scheme(), self.redacted())
    }
}

/// First eight characters of a secret, for logs.
pub(crate) fn redact(value: &str) -> &str {
    let end = value
        .char_indices()
        .nth(8)
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    &value[..end]
}

fn present<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a HeaderValue> {
    headers.get(name).filter(|v| !v.as_bytes().is_empty())
}

fn lossy(value: &HeaderValue) -> String {
    String::from_utf8_lossy(value.as_bytes()).into_owned()
}

/// Non-empty UTF-8 header value, if any.
pub(crate) fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn test_api_key_header() {
        let credential = Credential::extract(&headers(&[("api-key", "token")]));
        assert_eq!(credential, Credential::EncryptedApiKey("token".to_string()));
        assert_eq!(credential.value(), "token");
    }

    #[test]
    fn test_service_token_header() {
        let credential = Credential::extract(&headers(&[("x-token", "service")]));
        assert_eq!(credential.scheme(), Scheme::ServiceSharedSecret);
    }

    #[test]
    fn test_authorization_wins_over_everything() {
        let combos: &[&[(&'static str, &'static str)]] = &[
            &[("authorization", "a")],
            &[("authorization", "a"), ("x-token", "b")],
            &[("authorization", "a"), ("api-key", "c")],
            &[("api-key", "c"), ("x-token", "b"), ("authorization", "a")],
        ];

        for combo in combos {
            let credential = Credential::extract(&headers(combo));
            assert_eq!(credential, Credential::BearerToken("a".to_string()));
        }
    }

    #[test]
    fn test_service_token_wins_over_api_key() {
        let credential = Credential::extract(&headers(&[("api-key", "c"), ("x-token", "b")]));
        assert_eq!(credential, Credential::ServiceSharedSecret("b".to_string()));
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let credential = Credential::extract(&headers(&[("authorization", ""), ("api-key", "c")]));
        assert_eq!(credential.scheme(), Scheme::EncryptedApiKey);
    }

    #[test]
    fn test_non_utf8_authorization_is_still_bearer() {
        let mut map = headers(&[("x-token", "service"), ("api-key", "c")]);
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap(),
        );

        let credential = Credential::extract(&map);
        assert_eq!(credential.scheme(), Scheme::BearerToken);
        assert!(credential.value().starts_with("Bearer "));
    }

    #[test]
    fn test_no_credential() {
        let credential = Credential::extract(&HeaderMap::new());
        assert_eq!(credential, Credential::Unknown);
        assert_eq!(credential.value(), "");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credential = Credential::ServiceSharedSecret("super-secret-value".to_string());
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("super-se"));
    }
}
