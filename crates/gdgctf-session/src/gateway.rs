//! The session gateway: the only code that talks to the identity provider.
//!
//! Every provider call goes through here and is wrapped the same way:
//! failures are logged with the operation name and turned into a
//! [`SessionError`] that carries a user-facing message. Nothing panics and
//! nothing is retried.
//!
//! # Fail-closed session checks
//!
//! [`SessionGateway::get_session`] returns `None` when the provider errors.
//! Access control treats "could not prove a session" exactly like "no
//! session".

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::storage::clear_auth_artifacts;
use crate::{
    AuthOp, AuthStateChange, AuthStorageConfig, IdentityProvider, KeyValueStore, Session,
    SessionError, SignUpProfile, SignUpStatus,
};

/// Wraps an [`IdentityProvider`] with logging, error conversion and local
/// auth-artifact cleanup.
///
/// Cheap to clone: the provider and the stores are behind `Arc`s, so the
/// router and the login flow can each hold their own copy.
pub struct SessionGateway<P: IdentityProvider> {
    provider: Arc<P>,
    /// Local mirrors of provider state (`localStorage`, `sessionStorage`).
    stores: Vec<Arc<dyn KeyValueStore>>,
    storage_config: AuthStorageConfig,
}

impl<P: IdentityProvider> Clone for SessionGateway<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            stores: self.stores.clone(),
            storage_config: self.storage_config.clone(),
        }
    }
}

impl<P: IdentityProvider> SessionGateway<P> {
    /// Creates a gateway with no local stores to clean.
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            stores: Vec::new(),
            storage_config: AuthStorageConfig::default(),
        }
    }

    /// Registers a store whose auth artifacts are removed on sign-out.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.stores.push(store);
        self
    }

    /// Overrides which storage keys count as auth artifacts.
    pub fn with_storage_config(mut self, config: AuthStorageConfig) -> Self {
        self.storage_config = config;
        self
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Returns the current session, or `None` if there is none or the
    /// provider failed.
    pub async fn get_session(&self) -> Option<Session> {
        match self.provider.get_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(op = %AuthOp::GetSession, error = %e, "session check failed");
                None
            }
        }
    }

    /// Returns `true` if a session currently exists.
    pub async fn is_authenticated(&self) -> bool {
        self.get_session().await.is_some()
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    /// [`SessionError::Provider`] with the provider's message.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), SessionError> {
        match self.provider.sign_in_with_password(email, password).await {
            Ok(_) => {
                tracing::info!("signed in");
                Ok(())
            }
            Err(e) => {
                tracing::error!(op = %AuthOp::SignIn, error = %e, "login error");
                Err(SessionError::provider(AuthOp::SignIn, e))
            }
        }
    }

    /// Requests a new identity.
    ///
    /// Success means the provider accepted the request. Check the returned
    /// [`SignUpStatus`] before assuming a session exists.
    ///
    /// # Errors
    /// [`SessionError::Provider`] with the provider's message.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<SignUpStatus, SessionError> {
        let profile = SignUpProfile {
            display_name: display_name.to_owned(),
        };
        match self.provider.sign_up(email, password, &profile).await {
            Ok(Some(_)) => {
                tracing::info!("identity created with session");
                Ok(SignUpStatus::SessionCreated)
            }
            Ok(None) => {
                tracing::info!("identity created, confirmation pending");
                Ok(SignUpStatus::ConfirmationRequired)
            }
            Err(e) => {
                tracing::error!(op = %AuthOp::SignUp, error = %e, "register error");
                Err(SessionError::provider(AuthOp::SignUp, e))
            }
        }
    }

    /// Signs out on the provider, then clears local auth artifacts.
    ///
    /// Local cleanup runs whatever the provider call returned. The caller
    /// should redirect to the login page regardless of the result; the
    /// error is only informational.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let remote = self.provider.sign_out().await;
        if let Err(e) = &remote {
            tracing::error!(op = %AuthOp::SignOut, error = %e, "logout failed");
        }

        self.clear_local_artifacts();

        remote.map_err(|e| SessionError::provider(AuthOp::SignOut, e))
    }

    /// Removes provider-namespaced keys from every registered store.
    ///
    /// Storage failures are logged and skipped.
    pub fn clear_local_artifacts(&self) -> usize {
        let mut removed = 0;
        for store in &self.stores {
            match clear_auth_artifacts(store.as_ref(), &self.storage_config) {
                Ok(n) => removed += n,
                Err(e) => {
                    tracing::error!(store = store.name(), error = %e, "failed to clear stored auth session");
                }
            }
        }
        removed
    }

    /// Subscribes to provider-reported session transitions.
    pub fn on_session_change(&self) -> broadcast::Receiver<AuthStateChange> {
        self.provider.subscribe()
    }
}
