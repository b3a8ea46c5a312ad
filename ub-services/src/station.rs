//! Nearby station directory.
//!
//! Failures never reach the caller: the view falls back to an empty list and
//! the error is logged.

use tokio::sync::watch;
use tracing::{info, warn};

use ub_api::ApiClient;
use ub_core::error::UbResult;
use ub_models::Station;

use crate::event_bus::{AppEvent, EventBus};
use crate::service::{Service, ServiceState};

/// What the map screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationsView {
    pub stations: Vec<Station>,
    pub loading: bool,
}

pub struct StationService {
    state: ServiceState,
    api: ApiClient,
    event_bus: EventBus,
    search_radius: u32,
    view: watch::Sender<StationsView>,
}

impl StationService {
    pub fn new(api: ApiClient, event_bus: EventBus, search_radius: u32) -> Self {
        let (view, _) = watch::channel(StationsView::default());
        Self {
            state: ServiceState::Created,
            api,
            event_bus,
            search_radius,
            view,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<StationsView> {
        self.view.subscribe()
    }

    pub fn view(&self) -> StationsView {
        self.view.borrow().clone()
    }

    /// Fetch stations around a point, fire stations first.
    pub async fn refresh(&self, latitude: f64, longitude: f64) -> Vec<Station> {
        self.view.send_modify(|v| v.loading = true);

        let stations = match self
            .api
            .get_stations(latitude, longitude, self.search_radius)
            .await
        {
            Ok(stations) => {
                info!(
                    "loaded {} stations around {latitude},{longitude}",
                    stations.len()
                );
                stations
            }
            Err(e) => {
                warn!("station lookup around {latitude},{longitude} failed: {e}");
                Vec::new()
            }
        };

        self.view.send_replace(StationsView {
            stations: stations.clone(),
            loading: false,
        });
        self.event_bus.emit(AppEvent::StationsLoaded {
            count: stations.len(),
        });
        stations
    }
}

impl Service for StationService {
    fn name(&self) -> &str {
        "stations"
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
