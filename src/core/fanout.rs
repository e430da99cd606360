use crate::adapters::database::device_repo::DeviceRegistry;
use crate::adapters::push::{AccessToken, PushError, PushGateway};
use crate::domain::device::DeviceRegistration;
use crate::domain::notification::{DeliveryOutcome, PushMessage};
use futures::stream::{self, StreamExt};
use opentelemetry::{KeyValue, global, metrics::Counter};
use tracing::Instrument;

#[derive(Clone, Debug)]
struct Metrics {
    sent: Counter<u64>,
    errors: Counter<u64>,
    invalidated_tokens: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("hiremebuddy-push");
        Self {
            sent: meter
                .u64_counter("push_sent_total")
                .with_description("Total number of push notifications successfully sent")
                .build(),
            errors: meter
                .u64_counter("push_errors_total")
                .with_description("Total number of push notification delivery errors")
                .build(),
            invalidated_tokens: meter
                .u64_counter("push_invalidated_tokens_total")
                .with_description("Total number of device registrations deactivated due to being unregistered")
                .build(),
        }
    }
}

/// Delivers one message to many devices with independent failure handling.
#[derive(Debug, Clone)]
pub struct FanOut {
    max_in_flight: usize,
    metrics: Metrics,
}

impl FanOut {
    #[must_use]
    pub fn new(max_in_flight: usize) -> Self {
        Self { max_in_flight: max_in_flight.max(1), metrics: Metrics::new() }
    }

    /// Sends `message` to every device and waits for all of them to settle.
    ///
    /// The returned outcomes line up one-to-one with `devices`.
    #[tracing::instrument(level = "debug", skip_all, fields(devices = devices.len()))]
    pub async fn deliver_all(
        &self,
        gateway: &dyn PushGateway,
        registry: &dyn DeviceRegistry,
        project_id: &str,
        access_token: &AccessToken,
        devices: &[DeviceRegistration],
        message: &PushMessage,
    ) -> Vec<DeliveryOutcome> {
        stream::iter(devices.iter().cloned())
            .map(move |device| {
                let span = tracing::debug_span!("deliver", device_id = %device.id, platform = %device.platform);
                async move { self.deliver_one(gateway, registry, project_id, access_token, &device, message).await }
                    .instrument(span)
            })
            .buffered(self.max_in_flight)
            .collect()
            .await
    }

    async fn deliver_one(
        &self,
        gateway: &dyn PushGateway,
        registry: &dyn DeviceRegistry,
        project_id: &str,
        access_token: &AccessToken,
        device: &DeviceRegistration,
        message: &PushMessage,
    ) -> DeliveryOutcome {
        match gateway.send(project_id, access_token, &device.token, message).await {
            Ok(message_id) => {
                tracing::debug!(message_id = %message_id, "Push notification sent successfully");
                self.metrics.sent.add(1, &[]);
                DeliveryOutcome::Delivered { message_id }
            }
            Err(PushError::Unregistered) => {
                tracing::info!("Token unregistered, deactivating device registration");
                self.metrics.invalidated_tokens.add(1, &[]);
                if let Err(e) = registry.deactivate(&device.token).await {
                    tracing::error!(error = %e, "Failed to deactivate unregistered device");
                }
                DeliveryOutcome::InvalidToken
            }
            Err(PushError::QuotaExceeded) => {
                tracing::warn!("Push quota exceeded");
                self.metrics.errors.add(1, &[KeyValue::new("reason", "quota_exceeded")]);
                DeliveryOutcome::Failed { reason: PushError::QuotaExceeded.to_string() }
            }
            Err(PushError::Other(reason)) => {
                tracing::warn!(error = %reason, "Failed to send push notification");
                self.metrics.errors.add(1, &[KeyValue::new("reason", "other")]);
                DeliveryOutcome::Failed { reason }
            }
        }
    }
}
