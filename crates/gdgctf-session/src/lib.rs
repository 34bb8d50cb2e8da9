//! Session gateway for the GDG CTF site.
//!
//! This crate is the site's only contact with the hosted identity provider:
//!
//! 1. **Capability set**: what the site needs from the provider
//!    ([`IdentityProvider`] trait)
//! 2. **Gateway**: logging, fail-closed session checks, error conversion,
//!    best-effort sign-out ([`SessionGateway`])
//! 3. **Local artifacts**: provider-namespaced keys in browser storage,
//!    removed on logout ([`KeyValueStore`], [`AuthStorageConfig`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Router / Login flow (above)  ← ask "is there a session?", sign in/up/out
//!     ↕
//! Session Layer (this crate)  ← wraps every provider call
//!     ↕
//! Identity provider (external)
//! ```

mod error;
mod gateway;
mod memory;
mod provider;
mod session;
mod storage;

pub use error::{AuthOp, ProviderError, SessionError, StorageError};
pub use gateway::SessionGateway;
pub use memory::MemoryIdentityProvider;
pub use provider::IdentityProvider;
pub use session::{AuthEvent, AuthStateChange, Session, SignUpProfile, SignUpStatus};
pub use storage::{AuthStorageConfig, KeyValueStore, MemoryStore, clear_auth_artifacts};
