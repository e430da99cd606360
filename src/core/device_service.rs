use crate::adapters::database::device_repo::DeviceRegistry;
use crate::domain::device::NewDeviceRegistration;
use crate::error::Result;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct DeviceService {
    registry: Arc<dyn DeviceRegistry>,
}

impl DeviceService {
    #[must_use]
    pub fn new(registry: Arc<dyn DeviceRegistry>) -> Self {
        Self { registry }
    }

    /// Registers a device for a user, reactivating it if it was previously disabled.
    ///
    /// # Errors
    /// Returns an error if the registry write fails.
    #[tracing::instrument(skip(self, registration), fields(user_id = %registration.user_id, platform = %registration.platform))]
    pub async fn register(&self, registration: NewDeviceRegistration) -> Result<()> {
        self.registry.upsert(&registration).await
    }
}
