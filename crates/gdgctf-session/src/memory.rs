//! An in-process identity provider for development and tests.
//!
//! Behaves like a hosted provider with password auth: accounts, optional
//! email confirmation, a single current session, session-change events,
//! and a token mirrored into a browser-style store under
//! `sb-<project>-auth-token`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::Rng;
use tokio::sync::broadcast;

use crate::{
    AuthEvent, AuthStateChange, IdentityProvider, KeyValueStore, ProviderError, Session,
    SignUpProfile,
};

/// Capacity of the session-change channel. Slow subscribers lag rather
/// than block the provider.
const EVENT_CHANNEL_SIZE: usize = 32;

/// Provider-side minimum password length.
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    password: String,
    display_name: String,
    confirmed: bool,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    current: Option<(String, Session)>,
}

/// In-memory [`IdentityProvider`].
pub struct MemoryIdentityProvider {
    state: Mutex<State>,
    events: broadcast::Sender<AuthStateChange>,
    require_email_confirmation: bool,
    project_ref: String,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl MemoryIdentityProvider {
    /// Creates a provider that requires email confirmation, like a default
    /// hosted project.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            state: Mutex::new(State::default()),
            events,
            require_email_confirmation: true,
            project_ref: "local".to_string(),
            store: None,
        }
    }

    /// Whether new identities must confirm their email before signing in.
    pub fn require_email_confirmation(mut self, required: bool) -> Self {
        self.require_email_confirmation = required;
        self
    }

    /// Project reference used in the mirrored storage key.
    pub fn project_ref(mut self, project_ref: impl Into<String>) -> Self {
        self.project_ref = project_ref.into();
        self
    }

    /// Mirrors the session token into `store`, as a browser SDK would.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Adds an already-confirmed account.
    pub fn with_account(self, email: &str, password: &str, display_name: &str) -> Self {
        self.lock().accounts.insert(
            normalize_email(email),
            Account {
                password: password.to_owned(),
                display_name: display_name.to_owned(),
                confirmed: true,
            },
        );
        self
    }

    /// Storage key the session token is mirrored under.
    pub fn storage_key(&self) -> String {
        format!("sb-{}-auth-token", self.project_ref)
    }

    /// Marks an account as confirmed. Returns `false` if it doesn't exist.
    pub fn confirm_email(&self, email: &str) -> bool {
        match self.lock().accounts.get_mut(&normalize_email(email)) {
            Some(account) => {
                account.confirmed = true;
                true
            }
            None => false,
        }
    }

    /// Display name of the signed-in user.
    pub fn current_display_name(&self) -> Option<String> {
        let state = self.lock();
        let (email, _) = state.current.as_ref()?;
        state.accounts.get(email).map(|a| a.display_name.clone())
    }

    /// Ends the current session as if it expired on the provider side.
    pub fn expire_session(&self) {
        let had_session = self.lock().current.take().is_some();
        if had_session {
            self.unmirror();
            tracing::info!("session expired");
            self.emit(AuthEvent::SignedOut, None);
        }
    }

    /// Issues a fresh token for the current session.
    pub fn refresh_session(&self) -> Option<Session> {
        let session = {
            let mut state = self.lock();
            let (email, _) = state.current.take()?;
            let session = Session::new(generate_token());
            state.current = Some((email, session.clone()));
            session
        };
        self.mirror(&session);
        self.emit(AuthEvent::TokenRefreshed, Some(session.clone()));
        Some(session)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open_session(&self, email: String) -> Session {
        let session = Session::new(generate_token());
        self.lock().current = Some((email, session.clone()));
        self.mirror(&session);
        self.emit(AuthEvent::SignedIn, Some(session.clone()));
        session
    }

    fn emit(&self, event: AuthEvent, session: Option<Session>) {
        // No subscribers is fine.
        let _ = self.events.send(AuthStateChange::new(event, session));
    }

    fn mirror(&self, session: &Session) {
        if let Some(store) = &self.store {
            if let Err(e) = store.set(&self.storage_key(), session.access_token()) {
                tracing::warn!(error = %e, "failed to mirror session token");
            }
        }
    }

    fn unmirror(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.remove(&self.storage_key()) {
                tracing::warn!(error = %e, "failed to remove mirrored session token");
            }
        }
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    async fn get_session(&self) -> Result<Option<Session>, ProviderError> {
        Ok(self.lock().current.as_ref().map(|(_, s)| s.clone()))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError> {
        let email = normalize_email(email);
        let account = self
            .lock()
            .accounts
            .get(&email)
            .cloned()
            .filter(|account| account.password == password)
            .ok_or_else(|| ProviderError::new("Invalid login credentials"))?;

        if !account.confirmed {
            return Err(ProviderError::new("Email not confirmed"));
        }

        Ok(self.open_session(email))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &SignUpProfile,
    ) -> Result<Option<Session>, ProviderError> {
        let email = normalize_email(email);
        if !is_plausible_email(&email) {
            return Err(ProviderError::new(
                "Unable to validate email address: invalid format",
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ProviderError::new(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters."
            )));
        }

        {
            let mut state = self.lock();
            if state.accounts.contains_key(&email) {
                return Err(ProviderError::new("User already registered"));
            }
            state.accounts.insert(
                email.clone(),
                Account {
                    password: password.to_owned(),
                    display_name: profile.display_name.clone(),
                    confirmed: !self.require_email_confirmation,
                },
            );
        }
        tracing::debug!(%email, "account created");

        if self.require_email_confirmation {
            Ok(None)
        } else {
            Ok(Some(self.open_session(email)))
        }
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let had_session = self.lock().current.take().is_some();
        self.unmirror();
        if had_session {
            self.emit(AuthEvent::SignedOut, None);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthStateChange> {
        self.events.subscribe()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

/// Generates a random 32-character hex token.
fn generate_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
