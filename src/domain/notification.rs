use std::collections::HashMap;

/// Deep link used when the caller does not supply one in `data["url"]`.
pub const DEFAULT_LINK: &str = "/";

/// The content of a single dispatch, shared by every device delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

impl PushMessage {
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>, data: HashMap<String, String>) -> Self {
        Self { title: title.into(), body: body.into(), data }
    }

    /// The link opened when the notification is tapped.
    #[must_use]
    pub fn link(&self) -> &str {
        self.data.get("url").map_or(DEFAULT_LINK, String::as_str)
    }
}

/// Result of one delivery attempt to one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { message_id: String },
    /// The gateway no longer recognises the token; the registration has been (or should be) deactivated.
    InvalidToken,
    Failed { reason: String },
}

impl DeliveryOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: usize,
    pub total: usize,
}

impl DispatchSummary {
    #[must_use]
    pub fn from_outcomes(outcomes: &[DeliveryOutcome]) -> Self {
        let sent = outcomes.iter().filter(|o| o.is_success()).count();
        Self { sent, failed: outcomes.len() - sent, total: outcomes.len() }
    }
}

/// Terminal, non-fatal states of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    NoDevices,
    Completed(DispatchSummary),
}

impl DispatchResult {
    #[must_use]
    pub const fn summary(&self) -> DispatchSummary {
        match self {
            Self::NoDevices => DispatchSummary { sent: 0, failed: 0, total: 0 },
            Self::Completed(summary) => *summary,
        }
    }
}
