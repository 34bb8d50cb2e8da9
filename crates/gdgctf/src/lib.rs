//! # gdgctf
//!
//! Client core of the GDG CTF event site.
//!
//! The site is a single document with four views (`landing`, `dashboard`,
//! `challenge`, `leaderboard`) selected by the URL fragment. `dashboard`
//! and `challenge` need a session from a hosted identity provider; without
//! one the visitor is sent to the login document with the requested page
//! as its `next` parameter, and brought back there after signing in.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use gdgctf::prelude::*;
//!
//! # async fn run(browser: impl Browser) -> Result<(), SiteError> {
//! gdgctf::init_tracing().ok();
//! let site = Site::builder()
//!     .config(SiteConfig::from_json("{}")?)
//!     .provider(Arc::new(MemoryIdentityProvider::new()))
//!     .build()?;
//! let (router, _task) = site.spawn_router(browser);
//! router.start().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod site;
mod telemetry;

pub use config::{ConfigError, ProviderConfig, SiteConfig};
pub use error::SiteError;
pub use site::{Site, SiteBuilder};
pub use telemetry::{DEFAULT_LOG_LEVEL, init_tracing};

pub use gdgctf_effects as effects;
pub use gdgctf_pages as pages;
pub use gdgctf_router as router;
pub use gdgctf_session as session;

pub mod prelude {
    pub use crate::{ConfigError, ProviderConfig, Site, SiteBuilder, SiteConfig, SiteError};
    pub use gdgctf_effects::{FlagTerminal, FlagVerdict};
    pub use gdgctf_pages::{NavOrigin, NavigationRequest, PageId};
    pub use gdgctf_router::{
        AuthFlow, AuthPage, Browser, FormFields, NavigationOutcome, Router, RouterHandle,
        StartOutcome, StatusMessage, SubmitOutcome,
    };
    pub use gdgctf_session::{
        IdentityProvider, KeyValueStore, MemoryIdentityProvider, MemoryStore, SessionGateway,
    };
}
