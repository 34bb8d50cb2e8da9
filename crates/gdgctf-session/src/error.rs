//! Error types for the session layer.

use std::fmt;

/// The provider operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOp {
    GetSession,
    SignIn,
    SignUp,
    SignOut,
}

impl fmt::Display for AuthOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GetSession => "get_session",
            Self::SignIn => "sign_in",
            Self::SignUp => "sign_up",
            Self::SignOut => "sign_out",
        };
        f.write_str(name)
    }
}

/// An error reported by the identity provider itself.
///
/// The message is whatever the provider said (`"Invalid login
/// credentials"`, `"Email not confirmed"`, ...) and is shown to the user
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the [`SessionGateway`](crate::SessionGateway).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No identity provider was configured. Every auth-dependent feature
    /// is unavailable.
    #[error("identity provider is not available")]
    ProviderUnavailable,

    /// A specific provider call failed.
    #[error("{op} failed: {message}")]
    Provider { op: AuthOp, message: String },
}

impl SessionError {
    pub(crate) fn provider(op: AuthOp, err: ProviderError) -> Self {
        Self::Provider {
            op,
            message: err.message,
        }
    }

    /// Text suitable for an inline status message.
    ///
    /// Falls back to a generic per-operation message when the provider
    /// returned an empty one.
    pub fn user_message(&self) -> &str {
        match self {
            Self::ProviderUnavailable => "Authentication service unavailable.",
            Self::Provider { message, .. } if !message.trim().is_empty() => message,
            Self::Provider { op, .. } => match op {
                AuthOp::SignIn => "Authentication failed.",
                AuthOp::SignUp => "Registration failed.",
                AuthOp::SignOut => "Logout failed.",
                AuthOp::GetSession => "Session check failed.",
            },
        }
    }
}

/// Errors from a key/value store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The store could not be accessed (disabled, quota, poisoned lock).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
