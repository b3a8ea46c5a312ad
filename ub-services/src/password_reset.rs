//! Password reset requests.

use std::sync::Arc;

use tracing::{info, warn};

use ub_core::error::{UbError, UbResult};

use crate::identity::IdentityProvider;
use crate::service::{Service, ServiceState};

pub struct PasswordResetService {
    state: ServiceState,
    identity: Arc<dyn IdentityProvider>,
}

impl PasswordResetService {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            state: ServiceState::Created,
            identity,
        }
    }

    /// Ask the identity provider to mail a reset link.
    pub async fn send_reset(&self, email: &str) -> UbResult<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(UbError::Validation("email is required".into()));
        }

        match self.identity.send_password_reset(email).await {
            Ok(()) => {
                info!("password reset mail requested for {email}");
                Ok(())
            }
            Err(e) => {
                warn!("password reset for {email} failed: {e}");
                Err(e)
            }
        }
    }

    /// The message the reset screen shows for a failure.
    pub fn describe_error(err: &UbError) -> String {
        match err {
            UbError::Validation(message) => message.clone(),
            UbError::AuthFailed(message) => format!("error: {message}"),
            other => format!("error: {other}"),
        }
    }
}

impl Service for PasswordResetService {
    fn name(&self) -> &str {
        "password_reset"
    }

    fn state(&self) -> ServiceState {
        self.state
    }

    fn init(&mut self) -> UbResult<()> {
        self.state = ServiceState::Running;
        Ok(())
    }

    fn shutdown(&mut self) -> UbResult<()> {
        self.state = ServiceState::Stopped;
        Ok(())
    }
}
