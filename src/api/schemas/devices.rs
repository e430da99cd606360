use crate::domain::device::{NewDeviceRegistration, Platform};
use serde::Deserialize;

const MAX_TOKEN_LEN: usize = 4096;

#[derive(Debug, Deserialize)]
pub struct RegisterDeviceRequest {
    pub user_id: String,
    pub token: String,
    #[serde(default = "default_platform")]
    pub platform: Platform,
}

const fn default_platform() -> Platform {
    Platform::Web
}

impl RegisterDeviceRequest {
    /// Validates the device registration payload.
    ///
    /// # Errors
    /// Returns an error if the user id or token is empty, or the token is excessively large (anti-abuse).
    pub fn validate(&self) -> Result<(), String> {
        if self.user_id.trim().is_empty() {
            return Err("user_id cannot be empty".into());
        }
        let trimmed = self.token.trim();
        if trimmed.is_empty() {
            return Err("Token cannot be empty".into());
        }
        if trimmed.chars().count() > MAX_TOKEN_LEN {
            return Err("Token is too long (max 4096 characters)".into());
        }
        Ok(())
    }
}

impl From<RegisterDeviceRequest> for NewDeviceRegistration {
    fn from(req: RegisterDeviceRequest) -> Self {
        Self { user_id: req.user_id.trim().to_string(), token: req.token.trim().to_string(), platform: req.platform }
    }
}
