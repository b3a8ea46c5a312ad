//! Application context: the shared infrastructure and every service.
//!
//! The context is the single owner of session state. Services are
//! initialized in dependency order and shut down in reverse.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use ub_api::{ApiClient, IdentityClient};
use ub_core::config::{AppConfig, ConfigHandle};
use ub_core::error::{UbError, UbResult};
use ub_core::platform;
use ub_live::{MessageSync, PollingSource, SnapshotSource};
use ub_models::Database;

use crate::alert::AlertService;
use crate::chat::ChatService;
use crate::event_bus::EventBus;
use crate::identity::{FirebaseIdentityProvider, IdentityProvider, UnconfiguredIdentityProvider};
use crate::message::MessageService;
use crate::password_reset::PasswordResetService;
use crate::registration::RegistrationService;
use crate::service::{Service, ServiceState};
use crate::session::SessionService;
use crate::station::StationService;

/// Everything a front end needs, wired together.
pub struct AppContext {
    pub config: ConfigHandle,
    pub database: Database,
    pub api: ApiClient,
    pub identity: Arc<dyn IdentityProvider>,
    pub event_bus: EventBus,
    pub source: Arc<dyn SnapshotSource>,
    pub session: SessionService,
    pub registration: RegistrationService,
    pub password_reset: PasswordResetService,
    pub stations: StationService,
    pub chats: ChatService,
    pub messages: MessageService,
    pub alerts: AlertService,
}

impl AppContext {
    /// Build a context from explicit parts.
    pub fn new(
        config: AppConfig,
        database: Database,
        api: ApiClient,
        identity: Arc<dyn IdentityProvider>,
        source: Arc<dyn SnapshotSource>,
        upload_dir: PathBuf,
    ) -> Self {
        let event_bus = EventBus::new(config.live.channel_capacity);
        let search_radius = config.stations.search_radius;

        Self {
            session: SessionService::new(database.clone(), identity.clone(), event_bus.clone()),
            registration: RegistrationService::new(api.clone(), identity.clone()),
            password_reset: PasswordResetService::new(identity.clone()),
            stations: StationService::new(api.clone(), event_bus.clone(), search_radius),
            chats: ChatService::new(api.clone(), event_bus.clone()),
            messages: MessageService::new(api.clone(), event_bus.clone(), upload_dir),
            alerts: AlertService::new(api.clone(), event_bus.clone()),
            config: ConfigHandle::new(config),
            database,
            api,
            identity,
            event_bus,
            source,
        }
    }

    /// Build the production context: on-disk database, the configured
    /// backend, the identity provider (when an API key is set) and the
    /// polling message source.
    pub fn from_config(config: AppConfig) -> UbResult<Self> {
        let db_path = config.effective_db_path()?;
        let database = Database::init(&db_path, &config.storage)?;
        let api = ApiClient::new(&config.server)?;

        let identity: Arc<dyn IdentityProvider> = if config.is_auth_configured() {
            let client = IdentityClient::new(&config.auth, config.server.api_timeout_ms)?;
            Arc::new(FirebaseIdentityProvider::new(client))
        } else {
            warn!("auth.api_key is not set; sign-in and registration are unavailable");
            Arc::new(UnconfiguredIdentityProvider)
        };

        let source: Arc<dyn SnapshotSource> = Arc::new(PollingSource::new(
            api.clone(),
            Duration::from_millis(config.live.poll_interval_ms.max(1)),
        ));
        let upload_dir = platform::cache_dir()?.join("uploads");

        Ok(Self::new(config, database, api, identity, source, upload_dir))
    }

    fn services_mut(&mut self) -> [&mut dyn Service; 7] {
        [
            &mut self.session,
            &mut self.registration,
            &mut self.password_reset,
            &mut self.stations,
            &mut self.chats,
            &mut self.messages,
            &mut self.alerts,
        ]
    }

    fn services(&self) -> [&dyn Service; 7] {
        [
            &self.session,
            &self.registration,
            &self.password_reset,
            &self.stations,
            &self.chats,
            &self.messages,
            &self.alerts,
        ]
    }

    /// Initialize every service in order. Stops at the first failure.
    pub fn init(&mut self) -> UbResult<()> {
        for svc in self.services_mut() {
            let name = svc.name().to_string();
            info!("initializing service: {name}");
            if let Err(e) = svc.init() {
                error!("failed to initialize service {name}: {e}");
                return Err(UbError::ServiceInit(format!("{name}: {e}")));
            }
        }
        info!("all services initialized");
        Ok(())
    }

    /// Shut down every service in reverse order. Errors are logged.
    pub fn shutdown(&mut self) {
        let mut services = self.services_mut();
        services.reverse();
        for svc in services {
            if svc.state() != ServiceState::Running {
                continue;
            }
            if let Err(e) = svc.shutdown() {
                error!("error shutting down service {}: {e}", svc.name());
            }
        }
        info!("all services shut down");
    }

    /// A message list state holder bound to this context's live source.
    pub fn message_sync(&self) -> MessageSync {
        MessageSync::new(self.source.clone())
    }

    /// Name, state and health of every service.
    pub fn health(&self) -> Vec<(String, ServiceState, bool)> {
        self.services()
            .iter()
            .map(|svc| (svc.name().to_string(), svc.state(), svc.is_healthy()))
            .collect()
    }
}
