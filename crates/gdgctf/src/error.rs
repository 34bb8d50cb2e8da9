//! Unified error type for the site.

use gdgctf_effects::FlagError;
use gdgctf_router::{AuthFlowError, RouterError, ValidationError};
use gdgctf_session::SessionError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    AuthFlow(#[from] AuthFlowError),

    /// A form input failed local validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Flag(#[from] FlagError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
