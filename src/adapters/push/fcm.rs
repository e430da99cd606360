use crate::adapters::push::{AccessToken, GatewayAuthError, PushError, PushGateway};
use crate::core::assertion::SignedAssertion;
use crate::domain::notification::PushMessage;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

pub const FCM_BASE_URL: &str = "https://fcm.googleapis.com";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Firebase Cloud Messaging HTTP v1 client.
#[derive(Debug, Clone)]
pub struct FcmGateway {
    client: reqwest::Client,
    base_url: String,
}

impl FcmGateway {
    /// Builds a client whose requests all share `request_timeout`.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string() })
    }

    fn send_url(&self, project_id: &str) -> String {
        format!("{}/v1/projects/{project_id}/messages:send", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: OutboundMessage<'a>,
}

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    token: &'a str,
    notification: Notification<'a>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    data: &'a HashMap<String, String>,
    webpush: WebpushConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Notification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct WebpushConfig<'a> {
    fcm_options: WebpushFcmOptions<'a>,
}

#[derive(Debug, Serialize)]
struct WebpushFcmOptions<'a> {
    link: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
}

/// Maps a failed send response to a permanent or transient `PushError`.
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> PushError {
    if status == StatusCode::NOT_FOUND {
        return PushError::Unregistered;
    }

    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    if let Some(error) = &parsed {
        let has_code = |code: &str| error.details.iter().any(|d| d.error_code.as_deref() == Some(code));
        let status_code = error.status.as_deref();

        if status_code == Some("NOT_FOUND") || has_code("UNREGISTERED") {
            return PushError::Unregistered;
        }
        if status_code == Some("RESOURCE_EXHAUSTED") || has_code("QUOTA_EXCEEDED") {
            return PushError::QuotaExceeded;
        }
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return PushError::QuotaExceeded;
    }

    let detail = parsed.and_then(|e| e.message).unwrap_or_else(|| body.chars().take(256).collect());
    PushError::Other(format!("HTTP {}: {detail}", status.as_u16()))
}

#[async_trait]
impl PushGateway for FcmGateway {
    #[tracing::instrument(level = "debug", skip(self, assertion), err)]
    async fn exchange_token(
        &self,
        token_uri: &str,
        assertion: &SignedAssertion,
    ) -> Result<AccessToken, GatewayAuthError> {
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let response = self
            .client
            .post(token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| GatewayAuthError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayAuthError::Rejected { status: status.as_u16(), body });
        }

        let token: TokenResponse =
            response.json().await.map_err(|e| GatewayAuthError::MalformedResponse(e.to_string()))?;
        Ok(AccessToken::new(token.access_token))
    }

    async fn send(
        &self,
        project_id: &str,
        access_token: &AccessToken,
        device_token: &str,
        message: &PushMessage,
    ) -> Result<String, PushError> {
        let request = SendRequest {
            message: OutboundMessage {
                token: device_token,
                notification: Notification { title: &message.title, body: &message.body },
                data: &message.data,
                webpush: WebpushConfig { fcm_options: WebpushFcmOptions { link: message.link() } },
            },
        };

        let response = self
            .client
            .post(self.send_url(project_id))
            .bearer_auth(access_token.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PushError::Other("request timed out".into())
                } else {
                    PushError::Other(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            let ack: SendResponse = response.json().await.map_err(|e| PushError::Other(e.to_string()))?;
            return Ok(ack.name);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, &body))
    }
}
