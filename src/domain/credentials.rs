use serde::Deserialize;
use std::fmt;
use thiserror::Error;

pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Service account credential is not configured")]
    Missing,
    #[error("Service account credential is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Service account credential is missing `{0}`")]
    MissingField(&'static str),
    #[error("Service account private key is malformed: {0}")]
    InvalidKey(String),
    #[error("Failed to sign assertion: {0}")]
    Signing(String),
}

/// The subset of a Google service-account JSON blob needed to mint assertions.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Parses and checks the credential blob.
    ///
    /// # Errors
    /// Returns `CredentialError::Parse` for invalid JSON and `CredentialError::MissingField`
    /// when a required field is absent or blank.
    pub fn from_json(raw: &str) -> Result<Self, CredentialError> {
        let key: Self = serde_json::from_str(raw)?;
        if key.project_id.trim().is_empty() {
            return Err(CredentialError::MissingField("project_id"));
        }
        if key.client_email.trim().is_empty() {
            return Err(CredentialError::MissingField("client_email"));
        }
        if key.private_key.trim().is_empty() {
            return Err(CredentialError::MissingField("private_key"));
        }
        Ok(key)
    }

    #[must_use]
    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(GOOGLE_TOKEN_URI)
    }
}

// Never print the private key.
impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}
