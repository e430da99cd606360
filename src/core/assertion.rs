use crate::domain::credentials::{CredentialError, ServiceAccountKey};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
pub const ASSERTION_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl AssertionClaims {
    #[must_use]
    pub fn new(issuer: &str, scope: &str, audience: &str, now: i64) -> Self {
        Self {
            iss: issuer.to_string(),
            scope: scope.to_string(),
            aud: audience.to_string(),
            iat: now,
            exp: now + ASSERTION_TTL_SECS,
        }
    }
}

/// A compact `header.claims.signature` JWT proving the service's identity to the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedAssertion(String);

impl SignedAssertion {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SignedAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignedAssertion(..)")
    }
}

/// Signs an RS256 assertion for `key` valid from `now` (unix seconds) for one hour.
///
/// # Errors
/// Returns `CredentialError::InvalidKey` if the private key cannot be parsed and
/// `CredentialError::Signing` if signing itself fails.
#[tracing::instrument(level = "debug", skip(key), fields(issuer = %key.client_email), err)]
pub fn sign_assertion(
    key: &ServiceAccountKey,
    scope: &str,
    audience: &str,
    now: i64,
) -> Result<SignedAssertion, CredentialError> {
    // Keys pasted into env vars frequently keep their escaped newlines.
    let pem = key.private_key.replace("\\n", "\n");
    let encoding_key =
        EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| CredentialError::InvalidKey(e.to_string()))?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid.clone_from(&key.private_key_id);

    let claims = AssertionClaims::new(&key.client_email, scope, audience, now);
    encode(&header, &claims, &encoding_key).map(SignedAssertion).map_err(|e| CredentialError::Signing(e.to_string()))
}
