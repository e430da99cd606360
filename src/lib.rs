#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod telemetry;

use crate::adapters::database::DbPool;
use crate::adapters::database::device_repo::{DeviceRegistry, PgDeviceRegistry};
use crate::adapters::push::PushGateway;
use crate::adapters::push::fcm::FcmGateway;
use crate::api::AppState;
use crate::config::Config;
use crate::core::device_service::DeviceService;
use crate::core::dispatch_service::DispatchService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Wires the registry and gateway into the services behind the HTTP API.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    registry: Option<Arc<dyn DeviceRegistry>>,
    gateway: Option<Arc<dyn PushGateway>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, registry: None, gateway: None }
    }

    #[must_use]
    pub fn with_database(mut self, pool: DbPool) -> Self {
        self.registry = Some(Arc::new(PgDeviceRegistry::new(pool)));
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: Arc<dyn DeviceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn with_gateway(mut self, gateway: Arc<dyn PushGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Builds the application state. Without an explicit gateway an FCM client is constructed from config.
    ///
    /// # Errors
    /// Returns an error if no registry was provided or the HTTP client cannot be built.
    pub fn build(self) -> anyhow::Result<AppState> {
        let registry = self.registry.ok_or_else(|| anyhow::anyhow!("Device registry is required"))?;
        let gateway: Arc<dyn PushGateway> = match self.gateway {
            Some(gateway) => gateway,
            None => Arc::new(FcmGateway::new(
                self.config.push.fcm_base_url.clone(),
                Duration::from_secs(self.config.push.request_timeout_secs),
            )?),
        };

        Ok(AppState {
            dispatch_service: DispatchService::new(Arc::clone(&registry), gateway, &self.config.push),
            device_service: DeviceService::new(registry),
        })
    }
}

/// Runs the embedded database migrations.
///
/// # Errors
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    sqlx::migrate!().run(pool).await?;
    Ok(())
}

/// Flips `shutdown_tx` to `true` on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });
}
