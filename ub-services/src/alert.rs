//! Panic alerts.
//!
//! An alert is posted from a detached task and the caller never sees the
//! outcome. Failures are logged and reported on the event bus only.

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use ub_api::ApiClient;
use ub_core::error::UbResult;
use ub_models::AlertRequest;

use crate::event_bus::{AppEvent, EventBus};
use crate::service::{Service, ServiceState};

pub struct AlertService {
    state: ServiceState,
    api: ApiClient,
    event_bus: EventBus,
}

impl AlertService {
    pub fn new(api: ApiClient, event_bus: EventBus) -> Self {
        Self {
            state: ServiceState::Created,
            api,
            event_bus,
        }
    }

    /// Post an alert with the caller's position. Returns immediately.
    pub fn send_panic_alert(&self, email: &str, latitude: f64, longitude: f64) -> JoinHandle<()> {
        let api = self.api.clone();
        let bus = self.event_bus.clone();
        let request = AlertRequest {
            email: email.to_string(),
            latitude,
            longitude,
        };

        tokio::spawn(async move {
            match api.send_alert(&request).await {
                Ok(status) => {
                    info!("panic alert for {} delivered ({status})", request.email);
                    bus.emit(AppEvent::AlertDispatched {
                        email: request.email,
                    });
                }
                Err(e) => {
                    if e.is_network() {
                        warn!("panic alert for {} not delivered: {e}", request.email);
                    } else {
                        error!("panic alert for {} failed: {e}", request.email);
                    }
                    bus.emit(AppEvent::AlertFailed {
                        email: request.email,
                        error: e.to_string(),
                    });
                }
            }
        })
    }
}

impl Service for AlertService {
    fn name(&self) -> &str {
        "alerts"
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
