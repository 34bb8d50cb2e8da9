//! Session types: what the identity provider hands back and announces.
//!
//! The site never looks inside a [`Session`]. Its only question is "is there
//! one?". The token accessor exists for provider implementations that need
//! to persist it.

use std::fmt;

/// Opaque proof that the user is authenticated.
///
/// `Debug` never prints the token, so sessions can be logged safely.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access_token: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Kind of session transition reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// Emitted once to new subscribers by some providers.
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// A session transition together with the session that is now current.
///
/// `session` is `None` after a sign-out or an expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStateChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

impl AuthStateChange {
    pub fn new(event: AuthEvent, session: Option<Session>) -> Self {
        Self { event, session }
    }

    /// Returns `true` if no session exists after this change.
    pub fn is_signed_out(&self) -> bool {
        self.session.is_none()
    }
}

/// Extra profile data attached to a new identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpProfile {
    pub display_name: String,
}

/// What a successful sign-up actually did.
///
/// Registration succeeding is not the same as being logged in: with email
/// confirmation enabled the provider only records the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpStatus {
    /// The identity exists but must be confirmed before signing in.
    ConfirmationRequired,
    /// The provider also opened a session.
    SessionCreated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session::new("super-secret");
        let printed = format!("{session:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("redacted"));
    }

    #[test]
    fn test_auth_state_change_signed_out_without_session() {
        let change = AuthStateChange::new(AuthEvent::SignedOut, None);
        assert!(change.is_signed_out());
        let change = AuthStateChange::new(AuthEvent::SignedIn, Some(Session::new("t")));
        assert!(!change.is_signed_out());
    }
}
