//! Two-phase account registration.
//!
//! Phase one creates the credential account at the identity provider and
//! remembers its uid. Phase two posts the profile to the backend under that
//! uid. A failure in phase two leaves the credential account in place.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use ub_api::ApiClient;
use ub_core::constants::BLOOD_TYPES;
use ub_core::error::{UbError, UbResult};
use ub_models::ProfileRequest;

use crate::identity::IdentityProvider;
use crate::service::{Service, ServiceState};

/// Everything the registration screen collects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
    pub birth_date: String,
    pub blood_type: String,
}

impl RegistrationForm {
    /// Check the profile fields before anything is sent.
    pub fn validate(&self) -> UbResult<()> {
        if self.email.trim().is_empty() || self.password.trim().is_empty() {
            return Err(UbError::Validation("email and password are required".into()));
        }
        if self.full_name.trim().is_empty() {
            return Err(UbError::Validation("full name is required".into()));
        }
        if !self.blood_type.is_empty() && !BLOOD_TYPES.contains(&self.blood_type.as_str()) {
            return Err(UbError::Validation(format!(
                "unknown blood type '{}', expected one of {}",
                self.blood_type,
                BLOOD_TYPES.join(", ")
            )));
        }
        Ok(())
    }

    fn profile(&self, uid: &str) -> ProfileRequest {
        ProfileRequest {
            firebase_uid: uid.to_string(),
            email: self.email.trim().to_string(),
            full_name: self.full_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            birth_date: self.birth_date.trim().to_string(),
            blood_type: self.blood_type.clone(),
        }
    }
}

pub struct RegistrationService {
    state: ServiceState,
    api: ApiClient,
    identity: Arc<dyn IdentityProvider>,
    pending_uid: Mutex<Option<String>>,
}

impl RegistrationService {
    pub fn new(api: ApiClient, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            state: ServiceState::Created,
            api,
            identity,
            pending_uid: Mutex::new(None),
        }
    }

    /// Uid of the credential account created by phase one, if any.
    pub fn pending_uid(&self) -> Option<String> {
        self.pending_uid
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Phase one: create the credential account.
    pub async fn create_credentials(&self, email: &str, password: &str) -> UbResult<String> {
        let email = email.trim();
        if email.is_empty() || password.trim().is_empty() {
            return Err(UbError::Validation("email and password are required".into()));
        }

        let user = self.identity.create_account(email, password).await?;
        info!("credential account created for {email}");
        *self
            .pending_uid
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(user.uid.clone());
        Ok(user.uid)
    }

    /// Phase two: post the profile under the uid from phase one.
    pub async fn submit_profile(&self, form: &RegistrationForm) -> UbResult<String> {
        let uid = self.pending_uid().ok_or_else(|| {
            UbError::Validation("no credential account; create credentials first".into())
        })?;

        let profile = form.profile(&uid);
        match self.api.register_user(&profile).await {
            Ok(body) => {
                info!("profile registered for {}", profile.email);
                Ok(body)
            }
            Err(e) => {
                warn!(
                    "profile registration failed for {}, credential account {uid} kept: {e}",
                    profile.email
                );
                Err(e)
            }
        }
    }

    /// Both phases in order.
    pub async fn register(&self, form: &RegistrationForm) -> UbResult<String> {
        form.validate()?;
        self.create_credentials(&form.email, &form.password).await?;
        self.submit_profile(form).await
    }

    /// The message the registration screen shows for a failure.
    pub fn describe_error(err: &UbError) -> String {
        match err {
            UbError::ServerError { status, message } => format!("server error: {status} - {message}"),
            UbError::NotFound(path) => format!("server error: 404 - {path}"),
            e if e.is_network() => "connection failed".to_string(),
            e => e.to_string(),
        }
    }
}

impl Service for RegistrationService {
    fn name(&self) -> &str {
        "registration"
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
