//! Authenticated user session.
//!
//! [`AuthSession`] holds the signed-in user and their tokens, mirrors them
//! into the [`KeyValueStore`] so a restart resumes the session, and
//! supplies the bearer token to the realtime channel.
//!
//! # Example
//!
//! ```no_run
//! use fraudwatch_client::{
//!     ApiClient, AuthSession, ClientConfig, FileStore, KeyValueStore, LoginRequest, RealtimeClient,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> fraudwatch_client::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open("session.json")?);
//! let api = ApiClient::new(&config, Arc::clone(&store))?;
//! let session = Arc::new(AuthSession::new(api, store));
//!
//! if !session.is_authenticated() {
//!     session.login(&LoginRequest::new("analyst@example.com", "secret")).await?;
//! }
//!
//! let realtime = RealtimeClient::new(&config, Arc::clone(&session));
//! realtime.connect();
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{error, info, warn};

use crate::api::{ApiClient, AuthResponse, LoginRequest, RegisterRequest};
use crate::error::Result;
use crate::protocol::User;
use crate::storage::{KeyValueStore, TokenSupplier, keys};

// ============================================================================
// Credentials
// ============================================================================

#[derive(Debug, Clone, Default)]
struct Credentials {
    user: Option<User>,
    token: Option<String>,
    refresh_token: Option<String>,
}

impl Credentials {
    fn load(store: &dyn KeyValueStore) -> Self {
        let token = read_slot(store, keys::AUTH_TOKEN);
        let refresh_token = read_slot(store, keys::REFRESH_TOKEN);

        let user = match store.get(keys::USER_DATA) {
            None => None,
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    error!(error = %e, "Stored user is corrupt; clearing session");
                    clear_slots(store);
                    return Self::default();
                }
            },
        };

        Self {
            user,
            token,
            refresh_token,
        }
    }

    fn save(&self, store: &dyn KeyValueStore) {
        if let Some(token) = &self.token {
            store.set(keys::AUTH_TOKEN, token.clone());
        }
        if let Some(refresh) = &self.refresh_token {
            store.set(keys::REFRESH_TOKEN, refresh.clone());
        }
        if let Some(user) = &self.user {
            match serde_json::to_string(user) {
                Ok(json) => store.set(keys::USER_DATA, json),
                Err(e) => warn!(error = %e, "Failed to persist user"),
            }
        }
    }
}

impl From<AuthResponse> for Credentials {
    fn from(auth: AuthResponse) -> Self {
        Self {
            user: Some(auth.user),
            token: Some(auth.token),
            refresh_token: Some(auth.refresh_token),
        }
    }
}

fn read_slot(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    store.get(key).filter(|value| !value.is_empty())
}

fn clear_slots(store: &dyn KeyValueStore) {
    store.remove(keys::AUTH_TOKEN);
    store.remove(keys::REFRESH_TOKEN);
    store.remove(keys::USER_DATA);
}

// ============================================================================
// AuthSession
// ============================================================================

/// Signed-in user and tokens, persisted to a store.
///
/// Tokens are always read back from the store, so a slot cleared
/// elsewhere (for example by [`ApiClient`] on a 401) ends the session here
/// too.
pub struct AuthSession {
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
    user: RwLock<Option<User>>,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user.read().as_ref().map(|u| u.email.clone()))
            .field("has_token", &self.token().is_some())
            .finish_non_exhaustive()
    }
}

impl AuthSession {
    /// Creates a session, resuming whatever `store` holds.
    ///
    /// A stored user that fails to parse clears every auth slot.
    pub fn new(api: ApiClient, store: Arc<dyn KeyValueStore>) -> Self {
        let credentials = Credentials::load(store.as_ref());
        Self {
            api,
            store,
            user: RwLock::new(credentials.user),
        }
    }

    /// Signs in and persists the result.
    ///
    /// # Errors
    ///
    /// Returns the API error; local state is left unchanged.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<User> {
        let auth = self.api.login(credentials).await.inspect_err(|e| {
            error!(error = %e, "Login failed");
        })?;
        Ok(self.establish(auth))
    }

    /// Registers and signs in, persisting the result.
    ///
    /// # Errors
    ///
    /// Returns the API error; local state is left unchanged.
    pub async fn register(&self, form: &RegisterRequest) -> Result<User> {
        let auth = self.api.register(form).await.inspect_err(|e| {
            error!(error = %e, "Registration failed");
        })?;
        Ok(self.establish(auth))
    }

    /// Signs out.
    ///
    /// Local state is cleared even if the server call fails.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            error!(error = %e, "Logout request failed");
        }
        self.clear();
        info!("Signed out");
    }

    /// Returns `true` iff both a stored token and a user are present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some() && self.user.read().is_some()
    }

    /// Returns the signed-in user.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.user.read().clone()
    }

    /// Returns the stored refresh token.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        read_slot(self.store.as_ref(), keys::REFRESH_TOKEN)
    }

    /// Returns the underlying API client.
    #[inline]
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn establish(&self, auth: AuthResponse) -> User {
        let user = auth.user.clone();
        let credentials = Credentials::from(auth);
        credentials.save(self.store.as_ref());
        *self.user.write() = credentials.user;

        info!(user_id = %user.id, "Signed in");
        user
    }

    fn clear(&self) {
        *self.user.write() = None;
        clear_slots(self.store.as_ref());
    }
}

impl TokenSupplier for AuthSession {
    fn token(&self) -> Option<String> {
        read_slot(self.store.as_ref(), keys::AUTH_TOKEN)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{Value, json};

    use crate::config::ClientConfig;
    use crate::error::Error;
    use crate::storage::MemoryStore;
    use crate::testutil::ScriptedTransport;

    fn user_json() -> Value {
        json!({
            "id": "u-1",
            "email": "analyst@example.com",
            "firstName": "Ada",
            "lastName": "Mugisha",
            "role": "analyst",
            "createdAt": "2025-01-01T00:00:00Z"
        })
    }

    fn auth_reply() -> Value {
        json!({
            "success": true,
            "data": { "user": user_json(), "token": "jwt", "refreshToken": "refresh" }
        })
    }

    fn session(transport: &ScriptedTransport, store: &Arc<MemoryStore>) -> AuthSession {
        let store: Arc<dyn KeyValueStore> = store.clone();
        let api = ApiClient::with_transport(
            &ClientConfig::default(),
            Arc::clone(&store),
            transport.clone(),
        );
        AuthSession::new(api, store)
    }

    #[tokio::test]
    async fn test_login_persists_credentials() {
        let transport = ScriptedTransport::replying(200, auth_reply());
        let store = Arc::new(MemoryStore::new());
        let auth = session(&transport, &store);
        assert!(!auth.is_authenticated());

        let user = auth
            .login(&LoginRequest::new("analyst@example.com", "pw"))
            .await
            .unwrap();

        assert_eq!(user.id, "u-1");
        assert!(auth.is_authenticated());
        assert_eq!(auth.token().as_deref(), Some("jwt"));
        assert_eq!(auth.refresh_token().as_deref(), Some("refresh"));
        assert_eq!(store.get(keys::AUTH_TOKEN).as_deref(), Some("jwt"));
        assert_eq!(store.get(keys::REFRESH_TOKEN).as_deref(), Some("refresh"));
        let stored: User = serde_json::from_str(&store.get(keys::USER_DATA).unwrap()).unwrap();
        assert_eq!(stored, user);
    }

    #[tokio::test]
    async fn test_failed_login_leaves_state() {
        let transport = ScriptedTransport::replying(
            200,
            json!({ "success": false, "error": "Invalid credentials" }),
        );
        let store = Arc::new(MemoryStore::new());
        let auth = session(&transport, &store);

        let err = auth
            .login(&LoginRequest::new("analyst@example.com", "wrong"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Api { ref message, .. } if message == "Invalid credentials"));
        assert!(!auth.is_authenticated());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_register_persists_credentials() {
        let transport = ScriptedTransport::replying(200, auth_reply());
        let store = Arc::new(MemoryStore::new());
        let auth = session(&transport, &store);

        let form = RegisterRequest {
            first_name: "Ada".into(),
            last_name: "Mugisha".into(),
            email: "analyst@example.com".into(),
            password: "pw".into(),
        };
        auth.register(&form).await.unwrap();

        assert!(auth.is_authenticated());
        assert_eq!(transport.last().url.path(), "/api/auth/register");
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_fails() {
        let transport = ScriptedTransport::replying(200, auth_reply());
        transport.push(500, json!({ "success": false }));
        let store = Arc::new(MemoryStore::new());
        store.set(keys::SETTINGS, "{}".into());
        let auth = session(&transport, &store);
        auth.login(&LoginRequest::new("a@b.c", "pw")).await.unwrap();

        auth.logout().await;

        assert!(!auth.is_authenticated());
        assert!(auth.token().is_none());
        assert!(auth.current_user().is_none());
        assert!(store.get(keys::AUTH_TOKEN).is_none());
        assert!(store.get(keys::USER_DATA).is_none());
        assert_eq!(store.get(keys::SETTINGS).as_deref(), Some("{}"));

        let logout = transport.last();
        assert_eq!(logout.url.path(), "/api/auth/logout");
        assert_eq!(logout.header("Authorization"), Some("Bearer jwt"));
    }

    #[tokio::test]
    async fn test_rejected_token_ends_session() {
        let transport = ScriptedTransport::replying(200, auth_reply());
        transport.push(401, json!({ "success": false, "message": "Token expired" }));
        let store = Arc::new(MemoryStore::new());
        let auth = session(&transport, &store);
        auth.login(&LoginRequest::new("a@b.c", "pw")).await.unwrap();
        assert!(auth.is_authenticated());

        let err = auth.api().profile().await.unwrap_err();

        assert!(err.is_unauthorized());
        assert!(auth.token().is_none());
        assert!(auth.refresh_token().is_none());
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn test_resumes_from_store() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::AUTH_TOKEN, "jwt".into());
        store.set(keys::USER_DATA, user_json().to_string());

        let auth = session(&ScriptedTransport::default(), &store);

        assert!(auth.is_authenticated());
        assert_eq!(auth.current_user().unwrap().first_name, "Ada");
        assert!(auth.refresh_token().is_none());
    }

    #[test]
    fn test_token_without_user_is_not_authenticated() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::AUTH_TOKEN, "jwt".into());

        let auth = session(&ScriptedTransport::default(), &store);

        assert!(!auth.is_authenticated());
        assert_eq!(auth.token().as_deref(), Some("jwt"));
    }

    #[test]
    fn test_corrupt_user_clears_slots() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::AUTH_TOKEN, "jwt".into());
        store.set(keys::REFRESH_TOKEN, "refresh".into());
        store.set(keys::USER_DATA, "{not json".into());

        let auth = session(&ScriptedTransport::default(), &store);

        assert!(!auth.is_authenticated());
        assert!(auth.token().is_none());
        assert!(store.is_empty());
    }
}
