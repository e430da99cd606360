use crate::adapters::database::DbPool;
use crate::adapters::database::records::DeviceRecord;
use crate::domain::device::{DeviceRegistration, NewDeviceRegistration};
use crate::error::{AppError, Result};
use async_trait::async_trait;

/// Storage of device registrations consumed by the dispatch pipeline.
#[async_trait]
pub trait DeviceRegistry: Send + Sync + std::fmt::Debug {
    /// Returns the active registrations for `user_id`, oldest first.
    ///
    /// # Errors
    /// Returns an error if the registry cannot be read.
    async fn find_active_for_user(&self, user_id: &str) -> Result<Vec<DeviceRegistration>>;

    /// Soft-disables the registration holding `token`.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    async fn deactivate(&self, token: &str) -> Result<()>;

    /// Inserts a registration, or reassigns and reactivates an existing one with the same token.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    async fn upsert(&self, registration: &NewDeviceRegistration) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct PgDeviceRegistry {
    pool: DbPool,
}

impl PgDeviceRegistry {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceRegistry for PgDeviceRegistry {
    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn find_active_for_user(&self, user_id: &str) -> Result<Vec<DeviceRegistration>> {
        let records = sqlx::query_as::<_, DeviceRecord>(
            r"
            SELECT id, user_id, token, platform, is_active, created_at
            FROM device_tokens
            WHERE user_id = $1 AND is_active = TRUE
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(level = "debug", skip(self, token), err)]
    async fn deactivate(&self, token: &str) -> Result<()> {
        sqlx::query("UPDATE device_tokens SET is_active = FALSE, updated_at = NOW() WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self, registration), fields(user_id = %registration.user_id), err)]
    async fn upsert(&self, registration: &NewDeviceRegistration) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO device_tokens (user_id, token, platform, is_active)
            VALUES ($1, $2, $3, TRUE)
            ON CONFLICT (token) DO UPDATE
            SET user_id = EXCLUDED.user_id,
                platform = EXCLUDED.platform,
                is_active = TRUE,
                updated_at = NOW()
            ",
        )
        .bind(&registration.user_id)
        .bind(&registration.token)
        .bind(registration.platform.as_str())
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(())
    }
}
