//! Client for the identity provider's REST interface (Firebase Auth).
//!
//! Only the three calls the app needs: password sign-in, account creation
//! and the password-reset mail.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ub_core::config::AuthConfig;
use ub_core::error::{UbError, UbResult};

use crate::client::ApiClient;
use crate::response::ErrorBody;

/// Account data returned by sign-in and sign-up.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    /// Provider-assigned user id.
    pub local_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobRequest<'a> {
    request_type: &'a str,
    email: &'a str,
}

/// HTTP client for the identity provider.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Client,
    endpoint: String,
    api_key: String,
}

impl IdentityClient {
    pub fn new(config: &AuthConfig, timeout_ms: Option<u64>) -> UbResult<Self> {
        if config.api_key.is_empty() {
            return Err(UbError::MissingConfig("auth.api_key".into()));
        }

        let mut builder = Client::builder();
        if let Some(ms) = timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let inner = builder
            .build()
            .map_err(|e| UbError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/accounts:{method}?key={}", self.endpoint, self.api_key)
    }

    async fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> UbResult<T> {
        debug!("identity call accounts:{method}");

        let resp = self
            .inner
            .post(self.url(method))
            .json(body)
            .send()
            .await
            .map_err(ApiClient::classify_error)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let reason = ErrorBody::describe(&text);
            warn!("identity call accounts:{method} rejected ({status}): {reason}");
            return Err(UbError::AuthFailed(reason));
        }

        ApiClient::parse_json(resp).await
    }

    /// Verify an email/password pair.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> UbResult<IdentityRecord> {
        self.call(
            "signInWithPassword",
            &PasswordRequest {
                email,
                password,
                return_secure_token: true,
            },
        )
        .await
    }

    /// Create a new email/password account.
    pub async fn sign_up(&self, email: &str, password: &str) -> UbResult<IdentityRecord> {
        self.call(
            "signUp",
            &PasswordRequest {
                email,
                password,
                return_secure_token: true,
            },
        )
        .await
    }

    /// Ask the provider to mail a password-reset link.
    pub async fn send_password_reset(&self, email: &str) -> UbResult<()> {
        let _: serde_json::Value = self
            .call(
                "sendOobCode",
                &OobRequest {
                    request_type: "PASSWORD_RESET",
                    email,
                },
            )
            .await?;
        Ok(())
    }
}
