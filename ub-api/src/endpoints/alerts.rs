//! Panic alert endpoint.

use ub_core::error::UbResult;
use ub_models::AlertRequest;

use crate::client::ApiClient;

impl ApiClient {
    /// Post a panic alert. Returns the status code on success.
    pub async fn send_alert(&self, alert: &AlertRequest) -> UbResult<u16> {
        let body = serde_json::to_value(alert)?;
        let resp = self.post("/alerts", &body).await?;
        Ok(resp.status().as_u16())
    }
}
