use crate::adapters::database::device_repo::DeviceRegistry;
use crate::adapters::push::PushGateway;
use crate::config::PushConfig;
use crate::core::assertion::{MESSAGING_SCOPE, sign_assertion};
use crate::core::fanout::FanOut;
use crate::domain::credentials::{CredentialError, ServiceAccountKey};
use crate::domain::notification::{DispatchResult, DispatchSummary, PushMessage};
use crate::error::DispatchError;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;
use time::OffsetDateTime;

#[derive(Clone, Debug)]
struct Metrics {
    dispatches: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("hiremebuddy-push");
        Self {
            dispatches: meter
                .u64_counter("push_dispatch_total")
                .with_description("Total number of dispatch invocations by terminal state")
                .build(),
        }
    }
}

/// Runs one dispatch per call: resolve devices, authenticate, fan out, aggregate.
///
/// Nothing is cached between calls; every dispatch signs a fresh assertion and
/// obtains a fresh access token.
#[derive(Clone, Debug)]
pub struct DispatchService {
    registry: Arc<dyn DeviceRegistry>,
    gateway: Arc<dyn PushGateway>,
    service_account: Option<Arc<str>>,
    token_uri: Option<String>,
    fanout: FanOut,
    metrics: Metrics,
}

impl DispatchService {
    #[must_use]
    pub fn new(registry: Arc<dyn DeviceRegistry>, gateway: Arc<dyn PushGateway>, config: &PushConfig) -> Self {
        if config.service_account.is_none() {
            tracing::warn!("No service account configured; dispatches to registered devices will fail");
        }

        Self {
            registry,
            gateway,
            service_account: config.service_account.as_deref().map(Arc::from),
            token_uri: config.token_uri.clone(),
            fanout: FanOut::new(config.max_in_flight),
            metrics: Metrics::new(),
        }
    }

    /// Dispatches `message` to every active device of `user_id`.
    ///
    /// Per-device failures are reported in the summary; only failures that prevent
    /// any delivery from being attempted are returned as errors.
    ///
    /// # Errors
    /// Returns `DispatchError::Lookup` if the registry read fails, `DispatchError::Configuration`
    /// if the credential is missing or unusable, and `DispatchError::Auth` if the token exchange fails.
    #[tracing::instrument(skip(self, message), fields(user_id = %user_id), err)]
    pub async fn dispatch(&self, user_id: &str, message: &PushMessage) -> Result<DispatchResult, DispatchError> {
        let result = self.run(user_id, message).await;
        let label = match &result {
            Ok(DispatchResult::NoDevices) => "no_devices",
            Ok(DispatchResult::Completed(_)) => "completed",
            Err(DispatchError::Configuration(_)) => "configuration_error",
            Err(DispatchError::Lookup(_)) => "lookup_error",
            Err(DispatchError::Auth(_)) => "auth_error",
        };
        self.metrics.dispatches.add(1, &[KeyValue::new("result", label)]);
        result
    }

    async fn run(&self, user_id: &str, message: &PushMessage) -> Result<DispatchResult, DispatchError> {
        let devices = self
            .registry
            .find_active_for_user(user_id)
            .await
            .map_err(|e| DispatchError::Lookup(e.to_string()))?;

        if devices.is_empty() {
            tracing::info!("No active devices registered for user");
            return Ok(DispatchResult::NoDevices);
        }

        let key = self.service_account().map_err(|e| DispatchError::Configuration(e.to_string()))?;
        let token_uri = self.token_uri.as_deref().unwrap_or_else(|| key.token_uri());

        let now = OffsetDateTime::now_utc().unix_timestamp();
        let assertion = sign_assertion(&key, MESSAGING_SCOPE, token_uri, now)
            .map_err(|e| DispatchError::Configuration(e.to_string()))?;

        let access_token = self
            .gateway
            .exchange_token(token_uri, &assertion)
            .await
            .map_err(|e| DispatchError::Auth(e.to_string()))?;

        let outcomes = self
            .fanout
            .deliver_all(
                self.gateway.as_ref(),
                self.registry.as_ref(),
                &key.project_id,
                &access_token,
                &devices,
                message,
            )
            .await;

        let summary = DispatchSummary::from_outcomes(&outcomes);
        tracing::info!(sent = summary.sent, failed = summary.failed, total = summary.total, "Dispatch complete");
        Ok(DispatchResult::Completed(summary))
    }

    fn service_account(&self) -> Result<ServiceAccountKey, CredentialError> {
        let raw = self.service_account.as_deref().ok_or(CredentialError::Missing)?;
        ServiceAccountKey::from_json(raw)
    }
}
