use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

/// The signed-in partner.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub uid: String,
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityProvider {
    EmailPassword,
    Google,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SignInError {
    #[error("Sign-in cancelled")]
    Cancelled,
    #[error("No network connection")]
    NoNetwork,
    #[error("Sign-in failed with code {code}")]
    Failed { code: String },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("Sign-out failed: {0}")]
    SignOut(String),
}

/// External authentication boundary.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_user(&self) -> Option<AuthUser>;

    /// Runs the interactive sign-in flow offering `providers`.
    async fn sign_in(&self, providers: &[IdentityProvider]) -> Result<AuthUser, SignInError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Credentials the local flow "types in" when sign-in is launched.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password: String,
    display_name: String,
}

/// Email/password accounts kept in memory.
///
/// The sign-in flow uses the credentials set with [`LocalAuthProvider::with_credentials`];
/// without them the flow behaves as if the user backed out of it.
pub struct LocalAuthProvider {
    accounts: HashMap<String, Account>,
    credentials: Option<Credentials>,
    current: RwLock<Option<AuthUser>>,
    online: AtomicBool,
}

impl Default for LocalAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalAuthProvider {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            credentials: None,
            current: RwLock::new(None),
            online: AtomicBool::new(true),
        }
    }

    pub fn with_account(
        mut self,
        email: impl Into<String>,
        password: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        let email = email.into();
        let account = Account {
            uid: format!("uid_{}", self.accounts.len() + 1),
            password: password.into(),
            display_name: display_name.into(),
        };
        self.accounts.insert(email, account);
        self
    }

    pub fn with_credentials(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            email: email.into(),
            password: password.into(),
        });
        self
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn current_user(&self) -> Option<AuthUser> {
        self.current.read().await.clone()
    }

    #[instrument(skip(self))]
    async fn sign_in(&self, providers: &[IdentityProvider]) -> Result<AuthUser, SignInError> {
        if !providers.contains(&IdentityProvider::EmailPassword) {
            warn!("Email/password provider not offered");
            return Err(SignInError::Failed {
                code: "PROVIDER_DISABLED".to_string(),
            });
        }
        let Some(credentials) = &self.credentials else {
            info!("Sign-in flow dismissed");
            return Err(SignInError::Cancelled);
        };
        if !self.is_online() {
            return Err(SignInError::NoNetwork);
        }

        let account = self
            .accounts
            .get(&credentials.email)
            .ok_or_else(|| SignInError::Failed {
                code: "USER_NOT_FOUND".to_string(),
            })?;
        if account.password != credentials.password {
            return Err(SignInError::Failed {
                code: "WRONG_PASSWORD".to_string(),
            });
        }

        let user = AuthUser {
            uid: account.uid.clone(),
            display_name: account.display_name.clone(),
            email: credentials.email.clone(),
        };
        *self.current.write().await = Some(user.clone());
        info!(uid = %user.uid, "Signed in");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<(), AuthError> {
        // The local session always ends, even when the remote call fails.
        *self.current.write().await = None;
        if !self.is_online() {
            return Err(AuthError::SignOut("no network".to_string()));
        }
        info!("Signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [IdentityProvider; 2] = [IdentityProvider::EmailPassword, IdentityProvider::Google];

    fn provider() -> LocalAuthProvider {
        LocalAuthProvider::new().with_account("ana@nilo.test", "secret", "Ana")
    }

    #[tokio::test]
    async fn sign_in_with_matching_credentials_sets_current_user() {
        let auth = provider().with_credentials("ana@nilo.test", "secret");
        let user = auth.sign_in(&ALL).await.unwrap();
        assert_eq!(user.display_name, "Ana");
        assert_eq!(auth.current_user().await, Some(user));
    }

    #[tokio::test]
    async fn missing_credentials_cancel_the_flow() {
        assert_eq!(provider().sign_in(&ALL).await, Err(SignInError::Cancelled));
    }

    #[tokio::test]
    async fn offline_sign_in_is_a_network_error() {
        let auth = provider().with_credentials("ana@nilo.test", "secret");
        auth.set_online(false);
        assert_eq!(auth.sign_in(&ALL).await, Err(SignInError::NoNetwork));
    }

    #[tokio::test]
    async fn wrong_password_reports_code() {
        let auth = provider().with_credentials("ana@nilo.test", "nope");
        assert_eq!(
            auth.sign_in(&ALL).await,
            Err(SignInError::Failed { code: "WRONG_PASSWORD".to_string() })
        );
    }

    #[tokio::test]
    async fn offline_sign_out_still_clears_user() {
        let auth = provider().with_credentials("ana@nilo.test", "secret");
        auth.sign_in(&ALL).await.unwrap();
        auth.set_online(false);
        assert!(auth.sign_out().await.is_err());
        assert_eq!(auth.current_user().await, None);
    }
}
