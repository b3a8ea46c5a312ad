//! Identity provider seam.
//!
//! The session and registration services only need four operations from the
//! identity provider; `FirebaseIdentityProvider` implements them over the
//! provider's REST interface.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use ub_api::IdentityClient;
use ub_core::error::{UbError, UbResult};

/// The account an identity provider vouches for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub uid: String,
    pub email: String,
}

/// Email/password identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify credentials and make the account current.
    async fn sign_in(&self, email: &str, password: &str) -> UbResult<AuthenticatedUser>;

    /// Create an account and make it current.
    async fn create_account(&self, email: &str, password: &str) -> UbResult<AuthenticatedUser>;

    /// Mail a password-reset link.
    async fn send_password_reset(&self, email: &str) -> UbResult<()>;

    /// Forget the current account.
    async fn sign_out(&self) -> UbResult<()>;

    /// The account made current by the last sign-in or sign-up.
    async fn current_user(&self) -> Option<AuthenticatedUser>;
}

/// Firebase Auth over REST.
pub struct FirebaseIdentityProvider {
    client: IdentityClient,
    current: RwLock<Option<AuthenticatedUser>>,
}

impl FirebaseIdentityProvider {
    pub fn new(client: IdentityClient) -> Self {
        Self {
            client,
            current: RwLock::new(None),
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> UbResult<AuthenticatedUser> {
        let record = self.client.sign_in_with_password(email, password).await?;
        let user = AuthenticatedUser {
            uid: record.local_id,
            email: if record.email.is_empty() { email.to_string() } else { record.email },
        };
        *self.current.write().await = Some(user.clone());
        Ok(user)
    }

    async fn create_account(&self, email: &str, password: &str) -> UbResult<AuthenticatedUser> {
        let record = self.client.sign_up(email, password).await?;
        info!("created identity account {}", record.local_id);
        let user = AuthenticatedUser {
            uid: record.local_id,
            email: if record.email.is_empty() { email.to_string() } else { record.email },
        };
        *self.current.write().await = Some(user.clone());
        Ok(user)
    }

    async fn send_password_reset(&self, email: &str) -> UbResult<()> {
        self.client.send_password_reset(email).await
    }

    async fn sign_out(&self) -> UbResult<()> {
        *self.current.write().await = None;
        Ok(())
    }

    async fn current_user(&self) -> Option<AuthenticatedUser> {
        self.current.read().await.clone()
    }
}

/// Stand-in used when no identity provider is configured. Every operation
/// that would reach the provider fails with `MissingConfig`.
#[derive(Debug, Default)]
pub struct UnconfiguredIdentityProvider;

impl UnconfiguredIdentityProvider {
    fn missing() -> UbError {
        UbError::MissingConfig("auth.api_key".into())
    }
}

#[async_trait]
impl IdentityProvider for UnconfiguredIdentityProvider {
    async fn sign_in(&self, _email: &str, _password: &str) -> UbResult<AuthenticatedUser> {
        Err(Self::missing())
    }

    async fn create_account(&self, _email: &str, _password: &str) -> UbResult<AuthenticatedUser> {
        Err(Self::missing())
    }

    async fn send_password_reset(&self, _email: &str) -> UbResult<()> {
        Err(Self::missing())
    }

    async fn sign_out(&self) -> UbResult<()> {
        Ok(())
    }

    async fn current_user(&self) -> Option<AuthenticatedUser> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_provider() {
        let provider = UnconfiguredIdentityProvider;
        assert!(matches!(
            provider.sign_in("a@b.c", "pw").await,
            Err(UbError::MissingConfig(_))
        ));
        assert!(provider.sign_out().await.is_ok());
        assert!(provider.current_user().await.is_none());
    }
}
