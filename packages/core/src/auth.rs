//! Admin Authentication
//!
//! [`AuthStore`] holds the session of whoever is using the admin screens.
//! The dashboard and editor sessions call [`AuthStore::require_admin`] before
//! touching any project; logging out clears the session.

use crate::config::AdminCredentials;
use crate::forms::{FormErrors, LoginForm};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Lifetime of sessions issued by [`LocalAuthProvider`]
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 14;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    Form(#[from] FormErrors),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Session expired, sign in again")]
    Expired,

    #[error("'{0}' is not an admin account")]
    NotElevated(String),

    #[error("Authentication backend unavailable: {0}")]
    Unavailable(String),
}

/// An authenticated session
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    identity: String,
    token: String,
    elevated: bool,
    expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        identity: impl Into<String>,
        token: impl Into<String>,
        elevated: bool,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            identity: identity.into(),
            token: token.into(),
            elevated,
            expires_at,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        !self.token.is_empty() && Utc::now() < self.expires_at
    }

    /// Whether the session belongs to an admin account
    pub fn is_elevated(&self) -> bool {
        self.elevated
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("elevated", &self.elevated)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Exchanges credentials for a [`Session`]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, identity: &str, secret: &str) -> Result<Session, AuthError>;
}

#[derive(Clone)]
struct Account {
    email: String,
    password: String,
    elevated: bool,
}

/// Auth provider backed by a fixed list of accounts
#[derive(Clone)]
pub struct LocalAuthProvider {
    accounts: Vec<Account>,
    ttl: Duration,
}

impl Default for LocalAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalAuthProvider {
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
            ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    /// Provider knowing only the configured admin account
    pub fn from_credentials(admin: &AdminCredentials) -> Self {
        Self::new().with_admin(admin.email(), admin.password())
    }

    pub fn with_admin(self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.with_account(email.into(), password.into(), true)
    }

    /// Non-admin account: can sign in but is refused by the admin gate
    pub fn with_user(self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.with_account(email.into(), password.into(), false)
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn with_account(mut self, email: String, password: String, elevated: bool) -> Self {
        self.accounts.retain(|a| !a.email.eq_ignore_ascii_case(&email));
        self.accounts.push(Account {
            email,
            password,
            elevated,
        });
        self
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn authenticate(&self, identity: &str, secret: &str) -> Result<Session, AuthError> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(identity.trim()) && a.password == secret)
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(Session::new(
            account.email.clone(),
            uuid::Uuid::new_v4().to_string(),
            account.elevated,
            Utc::now() + self.ttl,
        ))
    }
}

/// Current sign-in state of the admin front end
pub struct AuthStore {
    provider: Arc<dyn AuthProvider>,
    session: Option<Session>,
}

impl AuthStore {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            provider,
            session: None,
        }
    }

    /// Validate the form, then authenticate against the provider
    ///
    /// A failed attempt leaves any previous session untouched.
    pub async fn login(&mut self, form: &LoginForm) -> Result<&Session, AuthError> {
        form.validate()?;

        let session = self
            .provider
            .authenticate(form.email.trim(), &form.password)
            .await
            .map_err(|e| {
                tracing::warn!("Sign-in failed for {}: {}", form.email.trim(), e);
                e
            })?;

        tracing::info!("Signed in as {}", session.identity());
        let session: &Session = self.session.insert(session);
        Ok(session)
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!("Signed out {}", session.identity());
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_valid)
    }

    pub fn is_admin(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.is_valid() && s.is_elevated())
    }

    /// The current session, if it is valid and elevated
    pub fn require_admin(&self) -> Result<&Session, AuthError> {
        let session = self.session.as_ref().ok_or(AuthError::NotAuthenticated)?;
        if !session.is_valid() {
            return Err(AuthError::Expired);
        }
        if !session.is_elevated() {
            return Err(AuthError::NotElevated(session.identity().to_string()));
        }
        Ok(session)
    }
}

impl fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthStore")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> Arc<dyn AuthProvider> {
        Arc::new(
            LocalAuthProvider::new()
                .with_admin("admin@example.com", "secret1")
                .with_user("guest@example.com", "guest12"),
        )
    }

    #[tokio::test]
    async fn test_admin_login_and_logout() {
        let mut auth = AuthStore::new(provider());
        assert!(matches!(
            auth.require_admin(),
            Err(AuthError::NotAuthenticated)
        ));

        let session = auth
            .login(&LoginForm::new("Admin@Example.com", "secret1"))
            .await
            .unwrap();
        assert!(session.is_valid());
        assert!(session.is_elevated());
        assert!(auth.is_admin());
        assert!(auth.require_admin().is_ok());

        auth.logout();
        assert!(auth.session().is_none());
        assert!(!auth.is_valid());
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let mut auth = AuthStore::new(provider());

        let err = auth
            .login(&LoginForm::new("admin@example.com", "wrong-pass"))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::InvalidCredentials);
        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(auth.session().is_none());
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_provider() {
        let mut auth = AuthStore::new(provider());

        let err = auth
            .login(&LoginForm::new("not-an-email", "123"))
            .await
            .unwrap_err();

        match err {
            AuthError::Form(errors) => assert_eq!(errors.errors().len(), 2),
            other => panic!("expected form errors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_admin_is_refused_by_gate() {
        let mut auth = AuthStore::new(provider());
        auth.login(&LoginForm::new("guest@example.com", "guest12"))
            .await
            .unwrap();

        assert!(auth.is_valid());
        assert!(!auth.is_admin());
        assert!(matches!(
            auth.require_admin(),
            Err(AuthError::NotElevated(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_session_is_refused() {
        let provider = LocalAuthProvider::new()
            .with_admin("admin@example.com", "secret1")
            .with_ttl(Duration::seconds(-1));
        let mut auth = AuthStore::new(Arc::new(provider));
        auth.login(&LoginForm::new("admin@example.com", "secret1"))
            .await
            .unwrap();

        assert!(!auth.is_valid());
        assert_eq!(auth.require_admin().unwrap_err(), AuthError::Expired);
    }

    #[test]
    fn test_session_debug_hides_token() {
        let session = Session::new("a@b.co", "tok-123", true, Utc::now());
        assert!(!format!("{:?}", session).contains("tok-123"));
    }
}
