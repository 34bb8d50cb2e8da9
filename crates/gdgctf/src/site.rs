//! `Site` builder: wires config, provider and storage into the pieces a
//! page needs.

use std::sync::Arc;

use gdgctf_effects::{FlagTerminal, TypingEffect};
use gdgctf_router::{AuthFlow, AuthPage, Browser, Router, RouterHandle, spawn_router};
use gdgctf_session::{IdentityProvider, KeyValueStore, SessionError, SessionGateway};
use tokio::task::JoinHandle;

use crate::{SiteConfig, SiteError};

/// Builder for a [`Site`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use gdgctf::prelude::*;
///
/// let site = Site::builder()
///     .config(SiteConfig::default())
///     .provider(Arc::new(MemoryIdentityProvider::new()))
///     .store(Arc::new(MemoryStore::new("localStorage")))
///     .build()?;
/// assert_eq!(site.config().login_path, "login.html");
/// # Ok::<(), SiteError>(())
/// ```
pub struct SiteBuilder<P: IdentityProvider> {
    config: SiteConfig,
    provider: Option<Arc<P>>,
    stores: Vec<Arc<dyn KeyValueStore>>,
}

impl<P: IdentityProvider> SiteBuilder<P> {
    pub fn new() -> Self {
        Self {
            config: SiteConfig::default(),
            provider: None,
            stores: Vec::new(),
        }
    }

    /// Sets the config. It is validated on [`build`](Self::build).
    pub fn config(mut self, config: SiteConfig) -> Self {
        self.config = config;
        self
    }

    pub fn provider(mut self, provider: Arc<P>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Adds a store to clear auth artifacts from on logout.
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.stores.push(store);
        self
    }

    /// # Errors
    /// [`SessionError::ProviderUnavailable`] when no provider was set.
    pub fn build(self) -> Result<Site<P>, SiteError> {
        let Some(provider) = self.provider else {
            tracing::error!("identity provider not configured; auth features unavailable");
            return Err(SessionError::ProviderUnavailable.into());
        };
        let config = self.config.validated();

        let gateway = self
            .stores
            .into_iter()
            .fold(SessionGateway::new(provider), SessionGateway::with_store)
            .with_storage_config(config.auth_storage.clone());

        tracing::info!(
            index = %config.index_path,
            login = %config.login_path,
            protected = ?config.protected_pages,
            "site built"
        );
        Ok(Site { config, gateway })
    }
}

impl<P: IdentityProvider> Default for SiteBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// A configured site. Hands out routers, auth flows and page effects that
/// share one session gateway.
pub struct Site<P: IdentityProvider> {
    config: SiteConfig,
    gateway: SessionGateway<P>,
}

impl<P: IdentityProvider> Site<P> {
    pub fn builder() -> SiteBuilder<P> {
        SiteBuilder::new()
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn gateway(&self) -> &SessionGateway<P> {
        &self.gateway
    }

    /// Router for the index document.
    pub fn router<B: Browser>(&self, browser: B) -> Router<P, B> {
        Router::new(self.gateway.clone(), browser, self.config.router_config())
    }

    /// Starts a router task. Must be called from within a Tokio runtime.
    pub fn spawn_router<B: Browser>(&self, browser: B) -> (RouterHandle, JoinHandle<Router<P, B>>) {
        spawn_router(self.router(browser))
    }

    /// Flow for an auth document loaded with `query`.
    pub fn auth_flow<A: AuthPage>(&self, page: A, query: &str) -> AuthFlow<P, A> {
        AuthFlow::new(
            self.gateway.clone(),
            page,
            self.config.auth_flow_config(),
            query,
        )
    }

    pub fn flag_terminal(&self) -> FlagTerminal {
        FlagTerminal::new(self.config.flag.clone())
    }

    /// Hero typing effect with the default lines.
    pub fn typing_effect(&self) -> TypingEffect {
        TypingEffect::default()
    }
}
