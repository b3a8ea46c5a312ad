//! User registration endpoint.

use ub_core::error::UbResult;
use ub_models::ProfileRequest;

use crate::client::ApiClient;

impl ApiClient {
    /// Register the profile of an account that already exists at the
    /// identity provider. Returns the response body text.
    pub async fn register_user(&self, profile: &ProfileRequest) -> UbResult<String> {
        let body = serde_json::to_value(profile)?;
        let resp = self.post("/users/register", &body).await?;
        resp.text().await.map_err(Self::classify_error)
    }
}
