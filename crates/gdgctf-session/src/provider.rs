//! The identity provider hook.
//!
//! The site doesn't implement authentication itself. A hosted provider
//! (Supabase, Firebase, a custom service) issues sessions, stores
//! credentials and enforces password policy. The [`IdentityProvider`] trait
//! is the exact capability set the site consumes from it, and the provider
//! is handed to the [`SessionGateway`](crate::SessionGateway) once at
//! construction.

use std::future::Future;

use tokio::sync::broadcast;

use crate::{AuthStateChange, ProviderError, Session, SignUpProfile};

/// The capabilities the site needs from a hosted identity provider.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → the provider is shared between the router
///   task, the login flow and session-change listeners for the lifetime of
///   the application.
///
/// # Example
///
/// ```rust
/// use gdgctf_session::{
///     AuthStateChange, IdentityProvider, ProviderError, Session, SignUpProfile,
/// };
/// use tokio::sync::broadcast;
///
/// /// Treats everyone as signed out. Handy for public-only previews.
/// struct Anonymous {
///     events: broadcast::Sender<AuthStateChange>,
/// }
///
/// impl IdentityProvider for Anonymous {
///     async fn get_session(&self) -> Result<Option<Session>, ProviderError> {
///         Ok(None)
///     }
///
///     async fn sign_in_with_password(
///         &self,
///         _email: &str,
///         _password: &str,
///     ) -> Result<Session, ProviderError> {
///         Err(ProviderError::new("sign-in disabled"))
///     }
///
///     async fn sign_up(
///         &self,
///         _email: &str,
///         _password: &str,
///         _profile: &SignUpProfile,
///     ) -> Result<Option<Session>, ProviderError> {
///         Err(ProviderError::new("sign-up disabled"))
///     }
///
///     async fn sign_out(&self) -> Result<(), ProviderError> {
///         Ok(())
///     }
///
///     fn subscribe(&self) -> broadcast::Receiver<AuthStateChange> {
///         self.events.subscribe()
///     }
/// }
/// ```
pub trait IdentityProvider: Send + Sync + 'static {
    /// Returns the current session, if any.
    fn get_session(
        &self,
    ) -> impl Future<Output = Result<Option<Session>, ProviderError>> + Send;

    /// Signs in with email and password.
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, ProviderError>> + Send;

    /// Creates a new identity.
    ///
    /// # Returns
    /// - `Ok(None)`: the request was accepted; no session was opened
    ///   (email confirmation pending)
    /// - `Ok(Some(session))`: the provider also signed the user in
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &SignUpProfile,
    ) -> impl Future<Output = Result<Option<Session>, ProviderError>> + Send;

    /// Ends the current session on the provider side.
    fn sign_out(&self) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Subscribes to session transitions.
    ///
    /// Each call returns an independent receiver; dropping it unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<AuthStateChange>;
}
