use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Platform {
    Android,
    Ios,
    Web,
}

impl Platform {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Web => "web",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Platform {
    fn from(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "android" => Self::Android,
            "ios" => Self::Ios,
            // Browsers register through the web SDK; anything unrecognised is treated the same way.
            _ => Self::Web,
        }
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

/// A binding between a user and an opaque push-gateway device identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRegistration {
    pub id: Uuid,
    pub user_id: String,
    pub token: String,
    pub platform: Platform,
    pub is_active: bool,
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeviceRegistration {
    pub user_id: String,
    pub token: String,
    pub platform: Platform,
}
