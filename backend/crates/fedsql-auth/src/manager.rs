//! Global HTTP auth switch plus the session table.
//!
//! States: disabled, enabled with an unauthenticated session, enabled with
//! an authenticated session. While disabled every session passes the gate.

use chrono::Duration;
use fedsql_configs::AuthSettings;
use parking_lot::RwLock;
use serde::Serialize;

use crate::cookie::CookieConfig;
use crate::error::{AuthError, AuthResult};
use crate::password::{hash_password, verify_password};
use crate::session::{SessionId, SessionStore};

#[derive(Debug, Clone, Default)]
struct AuthState {
    http_auth_enabled: bool,
    username: String,
    password_hash: Option<String>,
}

/// Public view of the auth configuration. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthStatus {
    pub http_auth_enabled: bool,
    pub username: String,
}

/// Requested change to the auth configuration; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct AuthUpdate {
    pub http_auth_enabled: Option<bool>,
    pub username: Option<String>,
    pub password: Option<String>,
}

pub struct AuthManager {
    state: RwLock<AuthState>,
    /// Serializes updates end to end, including the async hashing step
    update_lock: tokio::sync::Mutex<()>,
    sessions: SessionStore,
    cookie: CookieConfig,
    bcrypt_cost: u32,
}

impl AuthManager {
    /// Auth disabled, no credentials.
    pub fn new(cookie: CookieConfig, session_ttl: Duration, bcrypt_cost: u32) -> Self {
        Self {
            state: RwLock::new(AuthState::default()),
            update_lock: tokio::sync::Mutex::new(()),
            sessions: SessionStore::new(session_ttl),
            cookie,
            bcrypt_cost,
        }
    }

    /// Build from the `[auth]` config section, hashing the configured password.
    pub async fn from_settings(settings: &AuthSettings) -> AuthResult<Self> {
        let cookie = CookieConfig {
            name: settings.cookie_name.clone(),
            secure: settings.cookie_secure,
            max_age_hours: settings.session_ttl_hours as i64,
            ..CookieConfig::default()
        };
        let manager = Self::new(
            cookie,
            Duration::hours(settings.session_ttl_hours as i64),
            settings.bcrypt_cost,
        );

        if settings.http_auth_enabled || !settings.password.is_empty() {
            manager
                .update(AuthUpdate {
                    http_auth_enabled: Some(settings.http_auth_enabled),
                    username: Some(settings.username.clone()),
                    password: Some(settings.password.clone()).filter(|p| !p.is_empty()),
                })
                .await?;
        }
        Ok(manager)
    }

    pub fn is_enabled(&self) -> bool {
        self.state.read().http_auth_enabled
    }

    pub fn status(&self) -> AuthStatus {
        let state = self.state.read();
        AuthStatus {
            http_auth_enabled: state.http_auth_enabled,
            username: state.username.clone(),
        }
    }

    pub fn cookie_config(&self) -> &CookieConfig {
        &self.cookie
    }

    /// Atomic read-modify-write of the auth configuration.
    ///
    /// Enabling requires a non-empty username and a password (new, or one
    /// already on record). On failure the previous state is untouched.
    /// Changing credentials logs out every session.
    pub async fn update(&self, update: AuthUpdate) -> AuthResult<AuthStatus> {
        let _guard = self.update_lock.lock().await;
        let current = self.state.read().clone();

        let enabled = update.http_auth_enabled.unwrap_or(current.http_auth_enabled);
        let username = update
            .username
            .map(|u| u.trim().to_string())
            .unwrap_or_else(|| current.username.clone());

        if enabled && username.is_empty() {
            return Err(AuthError::Validation(
                "username is required to enable http auth".to_string(),
            ));
        }

        // Hashes are salted, so an unchanged password is detected by verifying
        // it against the stored hash rather than by comparing hashes.
        let (password_hash, password_changed) = match update.password {
            Some(password) if password.is_empty() => {
                if enabled {
                    return Err(AuthError::Validation(
                        "password is required to enable http auth".to_string(),
                    ));
                }
                (current.password_hash.clone(), false)
            }
            Some(password) => match current.password_hash.as_deref() {
                Some(hash) if verify_password(&password, hash).await? => {
                    (current.password_hash.clone(), false)
                }
                _ => (Some(hash_password(&password, self.bcrypt_cost).await?), true),
            },
            None => (current.password_hash.clone(), false),
        };

        if enabled && password_hash.is_none() {
            return Err(AuthError::Validation(
                "password is required to enable http auth".to_string(),
            ));
        }

        let credentials_changed = username != current.username || password_changed;
        let newly_enabled = enabled && !current.http_auth_enabled;

        {
            let mut state = self.state.write();
            *state = AuthState {
                http_auth_enabled: enabled,
                username,
                password_hash,
            };
        }

        if credentials_changed || newly_enabled {
            self.sessions.deauthenticate_all();
        }

        let status = self.status();
        log::info!(
            "HTTP auth updated: enabled={}, username='{}'",
            status.http_auth_enabled,
            status.username
        );
        Ok(status)
    }

    /// Resolve or create the session behind a cookie token.
    pub fn open_session(&self, token: Option<&str>) -> (SessionId, bool) {
        self.sessions.open(token)
    }

    /// Numeric id of a live session, for `CONNECTION_ID()`.
    pub fn connection_id(&self, session: &SessionId) -> Option<u64> {
        self.sessions.connection_id(session)
    }

    /// Whether the session has logged in (regardless of the global switch).
    pub fn is_session_authenticated(&self, session: &SessionId) -> bool {
        self.sessions.is_authenticated(session)
    }

    /// Gate decision for protected endpoints.
    pub fn is_authorized(&self, session: Option<&SessionId>) -> bool {
        if !self.is_enabled() {
            return true;
        }
        session
            .map(|s| self.sessions.is_authenticated(s))
            .unwrap_or(false)
    }

    /// Verify credentials and return the (rotated) authenticated session.
    ///
    /// When auth is disabled this is a no-op that hands back the caller's
    /// session, or a new one.
    pub async fn login(
        &self,
        current: Option<&SessionId>,
        username: &str,
        password: &str,
    ) -> AuthResult<SessionId> {
        let state = self.state.read().clone();
        if !state.http_auth_enabled {
            return Ok(match current {
                Some(id) if self.sessions.get(id).is_some() => id.clone(),
                _ => self.sessions.create(false),
            });
        }

        let hash = state.password_hash.as_deref().ok_or(AuthError::InvalidCredentials)?;
        let password_ok = verify_password(password, hash).await?;
        if username.trim() != state.username || !password_ok {
            log::warn!("Failed login attempt for user '{}'", username);
            return Err(AuthError::InvalidCredentials);
        }

        if let Some(old) = current {
            self.sessions.remove(old);
        }
        let session = self.sessions.create(true);
        log::info!("User '{}' logged in", state.username);
        Ok(session)
    }

    /// Destroy the session. Returns whether it existed.
    pub fn logout(&self, session: &SessionId) -> bool {
        self.sessions.remove(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> AuthManager {
        AuthManager::new(CookieConfig::default(), Duration::hours(1), 4)
    }

    fn enable(username: &str, password: &str) -> AuthUpdate {
        AuthUpdate {
            http_auth_enabled: Some(true),
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_disabled_lets_everyone_through() {
        let auth = manager();
        let (session, _) = auth.open_session(None);
        assert!(auth.is_authorized(Some(&session)));
        assert!(auth.is_authorized(None));

        let same = auth.login(Some(&session), "", "").await.unwrap();
        assert_eq!(same, session);
    }

    #[tokio::test]
    async fn test_enabling_requires_credentials() {
        let auth = manager();
        let err = auth.update(enable("", "")).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert!(!auth.is_enabled());

        let err = auth.update(enable("admin", "")).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(auth.status().username, "");
    }

    #[tokio::test]
    async fn test_full_state_machine() {
        let auth = manager();
        let (session, _) = auth.open_session(None);

        auth.update(enable("admin", "pw")).await.unwrap();
        assert!(!auth.is_authorized(Some(&session)));

        assert_eq!(
            auth.login(Some(&session), "admin", "bad").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert!(!auth.is_authorized(Some(&session)));

        let logged_in = auth.login(Some(&session), "admin", "pw").await.unwrap();
        assert_ne!(logged_in, session);
        assert!(auth.is_authorized(Some(&logged_in)));
        assert!(!auth.is_authorized(Some(&session)));

        assert!(auth.logout(&logged_in));
        assert!(!auth.is_authorized(Some(&logged_in)));

        let again = auth.login(None, "admin", "pw").await.unwrap();
        auth.update(AuthUpdate {
            http_auth_enabled: Some(false),
            ..AuthUpdate::default()
        })
        .await
        .unwrap();
        assert!(auth.is_authorized(None));
        // toggling off keeps the session logged in
        assert!(auth.is_session_authenticated(&again));
    }

    #[tokio::test]
    async fn test_reenable_reuses_stored_password() {
        let auth = manager();
        auth.update(enable("admin", "pw")).await.unwrap();
        auth.update(AuthUpdate {
            http_auth_enabled: Some(false),
            ..AuthUpdate::default()
        })
        .await
        .unwrap();
        let status = auth
            .update(AuthUpdate {
                http_auth_enabled: Some(true),
                ..AuthUpdate::default()
            })
            .await
            .unwrap();
        assert!(status.http_auth_enabled);
        assert_eq!(status.username, "admin");
    }

    #[tokio::test]
    async fn test_resubmitting_same_credentials_keeps_sessions() {
        let auth = manager();
        auth.update(enable("admin", "pw")).await.unwrap();
        let session = auth.login(None, "admin", "pw").await.unwrap();

        auth.update(enable("admin", "pw")).await.unwrap();
        assert!(auth.is_authorized(Some(&session)));

        auth.update(enable("admin", "new-pw")).await.unwrap();
        assert!(!auth.is_authorized(Some(&session)));
        assert!(auth.login(None, "admin", "new-pw").await.is_ok());
    }
}
