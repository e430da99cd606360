use crate::core::assertion::SignedAssertion;
use crate::domain::notification::PushMessage;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod fcm;

#[derive(Error, Debug)]
pub enum PushError {
    #[error("Token is no longer registered")]
    Unregistered,
    #[error("Rate limit exceeded")]
    QuotaExceeded,
    #[error("External service error: {0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum GatewayAuthError {
    #[error("Token exchange request failed: {0}")]
    Transport(String),
    #[error("Token exchange rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Token exchange returned an unreadable response: {0}")]
    MalformedResponse(String),
}

/// Short-lived bearer credential for the send endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

#[async_trait]
pub trait PushGateway: Send + Sync + fmt::Debug {
    /// Exchanges a signed assertion for an access token.
    ///
    /// # Errors
    /// Any failure here is fatal for the dispatch.
    async fn exchange_token(&self, token_uri: &str, assertion: &SignedAssertion)
    -> Result<AccessToken, GatewayAuthError>;

    /// Delivers one message to one device token, returning the gateway's message id.
    ///
    /// # Errors
    /// Returns `PushError::Unregistered` if the token is invalid and should be deactivated.
    async fn send(
        &self,
        project_id: &str,
        access_token: &AccessToken,
        device_token: &str,
        message: &PushMessage,
    ) -> Result<String, PushError>;
}
