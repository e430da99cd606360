use crate::domain::device::{DeviceRegistration, Platform};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct DeviceRecord {
    pub(crate) id: Uuid,
    pub(crate) user_id: String,
    pub(crate) token: String,
    pub(crate) platform: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: Option<OffsetDateTime>,
}

impl From<DeviceRecord> for DeviceRegistration {
    fn from(record: DeviceRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            token: record.token,
            platform: Platform::from(record.platform.as_str()),
            is_active: record.is_active,
            created_at: record.created_at,
        }
    }
}
