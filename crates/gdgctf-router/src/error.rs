//! Error types for the router layer.

use gdgctf_session::SessionError;

/// Errors talking to a spawned router.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The router task has stopped; its command channel is closed.
    #[error("router is unavailable")]
    Unavailable,
}

/// Local form validation failures. These never reach the provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters.")]
    PasswordTooShort { min: usize },

    /// A required form field is missing or blank.
    #[error("Missing required field: {0}.")]
    MissingField(&'static str),
}

/// Why a login or registration submission failed.
///
/// `Display` is the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthFlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{}", .0.user_message())]
    Session(#[from] SessionError),
}
