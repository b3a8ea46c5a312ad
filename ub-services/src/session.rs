//! Session holder: who is signed in, persisted across restarts.
//!
//! The identity lives in memory behind a watch channel and, while signed in,
//! under a fixed namespace/key in the preferences table. A missing key means
//! nobody is signed in.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use ub_core::constants::{prefs, NO_IDENTITY};
use ub_core::error::{UbError, UbResult};
use ub_models::{Database, Preferences};

use crate::event_bus::{AppEvent, EventBus};
use crate::identity::IdentityProvider;
use crate::service::{Service, ServiceState};

/// Service that owns the current identity.
pub struct SessionService {
    state: ServiceState,
    database: Database,
    identity: Arc<dyn IdentityProvider>,
    event_bus: EventBus,
    current: watch::Sender<Option<String>>,
}

impl SessionService {
    pub fn new(database: Database, identity: Arc<dyn IdentityProvider>, event_bus: EventBus) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            state: ServiceState::Created,
            database,
            identity,
            event_bus,
            current,
        }
    }

    /// Load the stored identity into memory.
    pub fn restore(&self) -> UbResult<Option<String>> {
        let conn = self.database.conn()?;
        let stored = Preferences::get(&conn, prefs::NAMESPACE, prefs::ACTIVE_IDENTITY)?;
        self.current.send_replace(stored.clone());
        match &stored {
            Some(identity) => info!("restored session for {identity}"),
            None => info!("no stored session"),
        }
        Ok(stored)
    }

    /// The signed-in identity, if any.
    pub fn current(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    /// The identity as observers display it.
    pub fn display_identity(&self) -> String {
        self.current().unwrap_or_else(|| NO_IDENTITY.to_string())
    }

    /// The signed-in identity, or a validation error naming the action.
    pub fn require(&self, action: &str) -> UbResult<String> {
        self.current()
            .ok_or_else(|| UbError::Validation(format!("sign in before {action}")))
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.current.subscribe()
    }

    /// Verify credentials and remember the identity.
    pub async fn sign_in(&self, email: &str, password: &str) -> UbResult<String> {
        let email = email.trim();
        if email.is_empty() || password.trim().is_empty() {
            return Err(UbError::Validation(
                "email and password are required".into(),
            ));
        }

        let user = self.identity.sign_in(email, password).await?;

        {
            let conn = self.database.conn()?;
            Preferences::set(&conn, prefs::NAMESPACE, prefs::ACTIVE_IDENTITY, &user.email)?;
        }
        self.current.send_replace(Some(user.email.clone()));
        info!("signed in as {}", user.email);

        self.event_bus.emit(AppEvent::SessionChanged {
            identity: Some(user.email.clone()),
        });
        Ok(user.email)
    }

    /// Forget the identity locally and at the provider.
    pub async fn sign_out(&self) -> UbResult<()> {
        if let Err(e) = self.identity.sign_out().await {
            warn!("identity provider sign-out failed: {e}");
        }

        {
            let conn = self.database.conn()?;
            Preferences::remove(&conn, prefs::NAMESPACE, prefs::ACTIVE_IDENTITY)?;
        }
        self.current.send_replace(None);
        info!("signed out");

        self.event_bus.emit(AppEvent::SessionChanged { identity: None });
        Ok(())
    }
}

impl Service for SessionService {
    fn name(&self) -> &str {
        "session"
    }

    fn state(&self) -> ServiceState {
        self.state
    }

    fn init(&mut self) -> UbResult<()> {
        match self.restore() {
            Ok(_) => {
                self.state = ServiceState::Running;
                Ok(())
            }
            Err(e) => {
                self.state = ServiceState::Failed;
                Err(e)
            }
        }
    }

    fn shutdown(&mut self) -> UbResult<()> {
        self.state = ServiceState::Stopped;
        Ok(())
    }
}
