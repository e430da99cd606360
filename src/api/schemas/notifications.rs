use crate::domain::notification::{DispatchResult, PushMessage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct SendPushRequest {
    pub user_id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: Option<HashMap<String, String>>,
}

impl SendPushRequest {
    /// Validates the dispatch payload.
    ///
    /// # Errors
    /// Returns an error if the user id, title or body is blank.
    pub fn validate(&self) -> Result<(), String> {
        if self.user_id.trim().is_empty() {
            return Err("user_id cannot be empty".into());
        }
        if self.title.trim().is_empty() {
            return Err("title cannot be empty".into());
        }
        if self.body.trim().is_empty() {
            return Err("body cannot be empty".into());
        }
        Ok(())
    }

    #[must_use]
    pub fn into_message(self) -> (String, PushMessage) {
        let message = PushMessage::new(self.title, self.body, self.data.unwrap_or_default());
        (self.user_id, message)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SendPushResponse {
    Summary { success: bool, sent: usize, failed: usize, total: usize },
    Message { success: bool, message: String },
}

pub const NO_DEVICES_MESSAGE: &str = "No devices to notify";

impl From<DispatchResult> for SendPushResponse {
    fn from(result: DispatchResult) -> Self {
        match result {
            DispatchResult::NoDevices => Self::Message { success: true, message: NO_DEVICES_MESSAGE.to_string() },
            DispatchResult::Completed(summary) => {
                Self::Summary { success: true, sent: summary.sent, failed: summary.failed, total: summary.total }
            }
        }
    }
}
