//! Station directory endpoint.

use ub_core::error::UbResult;
use ub_models::{Station, StationsResponse};

use crate::client::ApiClient;

impl ApiClient {
    /// Stations around a coordinate, fire stations first, then police.
    ///
    /// The backend's query parameter keeps its historical name even though
    /// any coordinate is accepted.
    pub async fn get_stations(&self, lat: f64, lon: f64, radius: u32) -> UbResult<Vec<Station>> {
        let path = format!("/stations?guatemalaCityLocation={lat},{lon}&searchRadius={radius}");
        let resp: StationsResponse = self.get_json(&path).await?;
        Ok(resp.into_stations())
    }
}
