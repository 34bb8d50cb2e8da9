//! Session-gated hash router for the GDG CTF site.
//!
//! The [`Router`] owns all mutable UI state (active page, challenge timer)
//! and gates protected pages on a fresh session check. [`spawn_router`]
//! runs it as an actor fed by UI commands and provider session events.
//! [`AuthFlow`] drives the login and registration documents.

pub mod actor;
pub mod auth_flow;
mod browser;
pub mod chrome;
mod error;
mod router;

pub use actor::{RouterHandle, spawn_router};
pub use auth_flow::{
    AuthFlow, AuthFlowConfig, AuthPage, FormFields, FormMode, Severity, StartOutcome,
    StatusMessage, SubmitOutcome,
};
pub use browser::Browser;
pub use chrome::{HintToggle, NavMenu, navbar_scrolled};
pub use error::{AuthFlowError, RouterError, ValidationError};
pub use router::{NavigationOutcome, Router, RouterConfig};
