//! The router: one owner for all mutable UI state.
//!
//! Holds the active page and the challenge timer, and runs the navigation
//! transition:
//!
//! ```text
//! request ──sanitize──→ page ──protected?──yes──→ get_session()
//!                                 │                   │
//!                                 no             none │ some
//!                                 │                   ↓    │
//!                                 │          redirect to   │
//!                                 │          login?next=…  │
//!                                 ↓                        ↓
//!                              activate → fragment → scroll → timer
//! ```
//!
//! The session is asked for on every protected transition. Nothing is
//! cached, so a sign-out racing a navigation is seen by the next check.

use gdgctf_effects::{ChallengeClock, ChallengeTimer, ChallengeTimerConfig};
use gdgctf_pages::url::{fragment_for, fragment_page, login_url};
use gdgctf_pages::{NavOrigin, NavigationRequest, PageId, PageRegistry};
use gdgctf_session::{AuthStateChange, IdentityProvider, SessionGateway};
use tokio::sync::watch;

use crate::Browser;

// ---------------------------------------------------------------------------
// RouterConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Document holding the single-page views.
    pub index_path: String,
    /// Document holding the login form.
    pub login_path: String,
    /// Page shown for unknown or missing fragments.
    pub default_page: PageId,
    pub registry: PageRegistry,
    pub timer: ChallengeTimerConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            index_path: "index.html".to_string(),
            login_path: "login.html".to_string(),
            default_page: PageId::Landing,
            registry: PageRegistry::default(),
            timer: ChallengeTimerConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// NavigationOutcome
// ---------------------------------------------------------------------------

/// How a navigation attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The page is now the active view.
    Activated(PageId),
    /// No session for a protected page; the browser was sent to `url`.
    Redirected { target: PageId, url: String },
    /// The host has no view element for the page; nothing changed.
    MissingView(PageId),
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub struct Router<P: IdentityProvider, B: Browser> {
    gateway: SessionGateway<P>,
    browser: B,
    config: RouterConfig,
    active: Option<PageId>,
    timer: ChallengeTimer,
    /// Set once the browser was sent to another document.
    left: bool,
}

impl<P: IdentityProvider, B: Browser> Router<P, B> {
    pub fn new(gateway: SessionGateway<P>, browser: B, config: RouterConfig) -> Self {
        let timer = ChallengeTimer::new(config.timer.clone());
        Self {
            gateway,
            browser,
            config,
            active: None,
            timer,
            left: false,
        }
    }

    /// Shows the page named by the current fragment.
    pub async fn start(&mut self) -> NavigationOutcome {
        let fragment = self.browser.current_fragment();
        let page = fragment_page(&fragment, self.config.default_page);
        self.navigate(NavigationRequest::new(Some(page.as_str()), NavOrigin::Initial))
            .await
    }

    /// Follows a fragment change made by the browser (back/forward, manual
    /// edit). The address bar is already correct, so it isn't rewritten.
    pub async fn on_hash_change(&mut self) -> NavigationOutcome {
        let fragment = self.browser.current_fragment();
        self.navigate(NavigationRequest::from_hash_change(&fragment))
            .await
    }

    /// Runs the full transition for one request.
    ///
    /// Re-navigating to the active page re-runs every step.
    pub async fn navigate(&mut self, request: NavigationRequest) -> NavigationOutcome {
        let page = request.resolve(self.config.default_page);
        tracing::debug!(%page, origin = %request.origin, "navigating");

        if self.config.registry.is_protected(page) && self.gateway.get_session().await.is_none() {
            let url = self.redirect_to_login(page);
            return NavigationOutcome::Redirected { target: page, url };
        }

        if !self.browser.has_view(page) {
            tracing::warn!(%page, "no view for page");
            return NavigationOutcome::MissingView(page);
        }

        self.browser.clear_active();
        self.browser.activate_view(page);
        self.browser.highlight_links(page);
        self.browser.close_nav_menu();
        self.active = Some(page);

        if request.update_url {
            self.browser.replace_fragment(&fragment_for(page));
        }

        self.browser.scroll_to_top();

        if page == PageId::Challenge {
            self.timer.restart();
        }

        tracing::info!(%page, "page activated");
        NavigationOutcome::Activated(page)
    }

    /// Shorthand for navigating to a known page from code.
    pub async fn navigate_to(&mut self, page: PageId) -> NavigationOutcome {
        self.navigate(NavigationRequest::to_page(page)).await
    }

    /// Sends the browser to the login page with `next` as return target.
    pub fn redirect_to_login(&mut self, next: PageId) -> String {
        let url = login_url(&self.config.login_path, next);
        tracing::info!(%next, %url, "redirecting to login");
        self.browser.assign(&url);
        self.left = true;
        url
    }

    /// Reacts to a provider-reported session change.
    ///
    /// Only ever redirects away from a protected page, never into one, and
    /// never after the browser was already sent elsewhere. Returns the login
    /// URL if a redirect happened.
    pub fn on_session_change(&mut self, change: &AuthStateChange) -> Option<String> {
        tracing::debug!(event = ?change.event, signed_out = change.is_signed_out(), "session changed");
        if !change.is_signed_out() {
            return None;
        }
        self.leave_if_protected()
    }

    /// Asks the provider directly and leaves a protected page if there is
    /// no session. Used when session-change events were missed.
    pub async fn recheck_session(&mut self) -> Option<String> {
        if self.gateway.get_session().await.is_some() {
            return None;
        }
        self.leave_if_protected()
    }

    /// Signs out and always ends on the login page.
    ///
    /// A failed provider sign-out is logged by the gateway; local auth
    /// artifacts are cleared either way.
    pub async fn logout(&mut self) -> String {
        if self.gateway.sign_out().await.is_err() {
            tracing::warn!("provider sign-out failed; continuing with local logout");
        }
        let url = self.config.login_path.clone();
        self.browser.assign(&url);
        self.left = true;
        tracing::info!("logged out");
        url
    }

    /// The page the fragment currently names.
    pub fn current_page(&self) -> PageId {
        fragment_page(&self.browser.current_fragment(), self.config.default_page)
    }

    pub fn active_page(&self) -> Option<PageId> {
        self.active
    }

    /// `true` once a full-page navigation was issued.
    pub fn has_left(&self) -> bool {
        self.left
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn browser_mut(&mut self) -> &mut B {
        &mut self.browser
    }

    pub fn gateway(&self) -> &SessionGateway<P> {
        &self.gateway
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn timer(&self) -> &ChallengeTimer {
        &self.timer
    }

    /// Challenge clock updates, for redrawing the timer display.
    pub fn timer_updates(&self) -> watch::Receiver<ChallengeClock> {
        self.timer.subscribe()
    }

    fn leave_if_protected(&mut self) -> Option<String> {
        if self.left {
            tracing::debug!("page already unloading; ignoring session change");
            return None;
        }
        let current = self.current_page();
        self.config
            .registry
            .is_protected(current)
            .then(|| self.redirect_to_login(current))
    }
}
