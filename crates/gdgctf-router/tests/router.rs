//! Integration tests for the router and its actor.
//!
//! The browser is a recorder shared through `Arc<Mutex<_>>` so tests can
//! inspect it after the router (or the router task) has taken ownership.
//! Time-based checks use `start_paused = true`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gdgctf_pages::url::{next_page, query_param};
use gdgctf_pages::{NavOrigin, NavigationRequest, PageId};
use gdgctf_router::{
    Browser, NavigationOutcome, Router, RouterConfig, RouterError, spawn_router,
};
use gdgctf_session::{
    AuthEvent, AuthStateChange, IdentityProvider, KeyValueStore, MemoryIdentityProvider,
    MemoryStore, ProviderError, Session, SessionGateway, SignUpProfile,
};
use tokio::sync::broadcast;

// =========================================================================
// Recording browser
// =========================================================================

#[derive(Default)]
struct BrowserState {
    views: Vec<PageId>,
    active_view: Option<PageId>,
    active_link: Option<PageId>,
    fragment: String,
    replaced: Vec<String>,
    assigned: Vec<String>,
    scrolls: usize,
    menu_closes: usize,
}

#[derive(Clone)]
struct RecordingBrowser(Arc<Mutex<BrowserState>>);

impl RecordingBrowser {
    fn with_fragment(fragment: &str) -> Self {
        let state = BrowserState {
            views: PageId::ALL.to_vec(),
            fragment: fragment.to_string(),
            ..BrowserState::default()
        };
        Self(Arc::new(Mutex::new(state)))
    }

    fn without_view(self, page: PageId) -> Self {
        self.0.lock().unwrap().views.retain(|p| *p != page);
        self
    }

    fn state(&self) -> std::sync::MutexGuard<'_, BrowserState> {
        self.0.lock().unwrap()
    }
}

impl Browser for RecordingBrowser {
    fn has_view(&self, page: PageId) -> bool {
        self.state().views.contains(&page)
    }

    fn clear_active(&mut self) {
        let mut state = self.state();
        state.active_view = None;
        state.active_link = None;
    }

    fn activate_view(&mut self, page: PageId) {
        self.state().active_view = Some(page);
    }

    fn highlight_links(&mut self, page: PageId) {
        self.state().active_link = Some(page);
    }

    fn close_nav_menu(&mut self) {
        self.state().menu_closes += 1;
    }

    fn replace_fragment(&mut self, fragment: &str) {
        let mut state = self.state();
        state.fragment = fragment.to_string();
        state.replaced.push(fragment.to_string());
    }

    fn scroll_to_top(&mut self) {
        self.state().scrolls += 1;
    }

    fn current_fragment(&self) -> String {
        self.state().fragment.clone()
    }

    fn assign(&mut self, url: &str) {
        self.state().assigned.push(url.to_string());
    }
}

// =========================================================================
// Scripted provider: session toggled by the test, calls counted.
// =========================================================================

struct ScriptedProvider {
    session: Mutex<Option<Session>>,
    session_checks: AtomicUsize,
    session_fails: bool,
    sign_out_fails: bool,
    events: broadcast::Sender<AuthStateChange>,
}

impl ScriptedProvider {
    fn new(signed_in: bool) -> Self {
        let (events, _) = broadcast::channel(8);
        Self {
            session: Mutex::new(signed_in.then(|| Session::new("token"))),
            session_checks: AtomicUsize::new(0),
            session_fails: false,
            sign_out_fails: false,
            events,
        }
    }

    fn failing_session(mut self) -> Self {
        self.session_fails = true;
        self
    }

    fn failing_sign_out(mut self) -> Self {
        self.sign_out_fails = true;
        self
    }

    fn set_signed_in(&self, signed_in: bool) {
        *self.session.lock().unwrap() = signed_in.then(|| Session::new("token"));
    }

    fn session_checks(&self) -> usize {
        self.session_checks.load(Ordering::SeqCst)
    }
}

impl IdentityProvider for ScriptedProvider {
    async fn get_session(&self) -> Result<Option<Session>, ProviderError> {
        self.session_checks.fetch_add(1, Ordering::SeqCst);
        if self.session_fails {
            return Err(ProviderError::new("session lookup failed"));
        }
        Ok(self.session.lock().unwrap().clone())
    }

    async fn sign_in_with_password(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<Session, ProviderError> {
        Err(ProviderError::new("not scripted"))
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _profile: &SignUpProfile,
    ) -> Result<Option<Session>, ProviderError> {
        Err(ProviderError::new("not scripted"))
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        if self.sign_out_fails {
            return Err(ProviderError::new("network unreachable"));
        }
        self.set_signed_in(false);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthStateChange> {
        self.events.subscribe()
    }
}

fn router(
    provider: &Arc<ScriptedProvider>,
    browser: &RecordingBrowser,
) -> Router<ScriptedProvider, RecordingBrowser> {
    Router::new(
        SessionGateway::new(Arc::clone(provider)),
        browser.clone(),
        RouterConfig::default(),
    )
}

// =========================================================================
// start() / initial load
// =========================================================================

#[tokio::test]
async fn test_start_landing_activates_and_writes_fragment() {
    let provider = Arc::new(ScriptedProvider::new(false));
    let browser = RecordingBrowser::with_fragment("#landing");
    let mut router = router(&provider, &browser);

    let outcome = router.start().await;

    assert_eq!(outcome, NavigationOutcome::Activated(PageId::Landing));
    assert_eq!(router.active_page(), Some(PageId::Landing));
    let state = browser.state();
    assert_eq!(state.active_view, Some(PageId::Landing));
    assert_eq!(state.active_link, Some(PageId::Landing));
    assert_eq!(state.fragment, "#landing");
    assert_eq!(state.scrolls, 1);
    assert_eq!(state.menu_closes, 1);
    // Public page: no session check.
    assert_eq!(provider.session_checks(), 0);
}

#[tokio::test]
async fn test_start_protected_without_session_redirects_with_next() {
    let provider = Arc::new(ScriptedProvider::new(false));
    let browser = RecordingBrowser::with_fragment("#dashboard");
    let mut router = router(&provider, &browser);

    let outcome = router.start().await;

    assert_eq!(
        outcome,
        NavigationOutcome::Redirected {
            target: PageId::Dashboard,
            url: "login.html?next=dashboard".to_string(),
        }
    );
    assert_eq!(router.active_page(), None);
    let state = browser.state();
    assert_eq!(state.assigned, vec!["login.html?next=dashboard"]);
    assert_eq!(state.active_view, None);
    assert!(state.replaced.is_empty());
}

#[tokio::test]
async fn test_start_empty_fragment_shows_default_page() {
    let provider = Arc::new(ScriptedProvider::new(false));
    let browser = RecordingBrowser::with_fragment("");
    let mut router = router(&provider, &browser);

    assert_eq!(
        router.start().await,
        NavigationOutcome::Activated(PageId::Landing)
    );
    assert_eq!(browser.state().fragment, "#landing");
}

// =========================================================================
// navigate()
// =========================================================================

#[tokio::test]
async fn test_navigate_injected_target_falls_back_to_default() {
    let provider = Arc::new(ScriptedProvider::new(true));
    let browser = RecordingBrowser::with_fragment("#landing");
    let mut router = router(&provider, &browser);

    for raw in ["<script>alert(1)</script>", "", "Dashboard", "../admin"] {
        let outcome = router
            .navigate(NavigationRequest::new(Some(raw), NavOrigin::Link))
            .await;
        assert_eq!(outcome, NavigationOutcome::Activated(PageId::Landing), "{raw:?}");
    }
    let outcome = router
        .navigate(NavigationRequest::new(None, NavOrigin::Button))
        .await;
    assert_eq!(outcome, NavigationOutcome::Activated(PageId::Landing));
}

#[tokio::test]
async fn test_navigate_challenge_unauthenticated_next_is_challenge() {
    let provider = Arc::new(ScriptedProvider::new(false));
    let browser = RecordingBrowser::with_fragment("#landing");
    let mut router = router(&provider, &browser);

    let outcome = router
        .navigate(NavigationRequest::new(Some("challenge"), NavOrigin::Link))
        .await;

    let NavigationOutcome::Redirected { target, url } = outcome else {
        panic!("expected redirect, got {outcome:?}");
    };
    assert_eq!(target, PageId::Challenge);
    let (path, query) = url.split_once('?').unwrap();
    assert_eq!(path, "login.html");
    assert_eq!(query_param(query, "next").as_deref(), Some("challenge"));
    assert_eq!(next_page(query, PageId::Dashboard), PageId::Challenge);
    assert!(!router.timer().is_running());
}

#[tokio::test]
async fn test_navigate_protected_checks_session_every_time() {
    let provider = Arc::new(ScriptedProvider::new(true));
    let browser = RecordingBrowser::with_fragment("#landing");
    let mut router = router(&provider, &browser);

    assert_eq!(
        router.navigate_to(PageId::Dashboard).await,
        NavigationOutcome::Activated(PageId::Dashboard)
    );
    assert_eq!(
        router.navigate_to(PageId::Dashboard).await,
        NavigationOutcome::Activated(PageId::Dashboard)
    );
    assert_eq!(provider.session_checks(), 2);

    provider.set_signed_in(false);
    let outcome = router.navigate_to(PageId::Dashboard).await;

    assert!(matches!(outcome, NavigationOutcome::Redirected { .. }));
    assert_eq!(provider.session_checks(), 3);
    // The earlier activation stays until the browser leaves.
    assert_eq!(router.active_page(), Some(PageId::Dashboard));
}

#[tokio::test]
async fn test_navigate_public_page_skips_session_check() {
    let provider = Arc::new(ScriptedProvider::new(false));
    let browser = RecordingBrowser::with_fragment("#landing");
    let mut router = router(&provider, &browser);

    assert_eq!(
        router.navigate_to(PageId::Leaderboard).await,
        NavigationOutcome::Activated(PageId::Leaderboard)
    );
    assert_eq!(provider.session_checks(), 0);
}

#[tokio::test]
async fn test_navigate_to_protected_session_error_redirects() {
    let provider = Arc::new(ScriptedProvider::new(true).failing_session());
    let browser = RecordingBrowser::with_fragment("#landing");
    let mut router = router(&provider, &browser);

    let outcome = router.navigate_to(PageId::Dashboard).await;

    assert_eq!(
        outcome,
        NavigationOutcome::Redirected {
            target: PageId::Dashboard,
            url: "login.html?next=dashboard".to_string(),
        }
    );
    assert_eq!(provider.session_checks(), 1);
    assert_eq!(router.active_page(), None);
    assert_eq!(browser.state().active_view, None);
}

#[tokio::test(start_paused = true)]
async fn test_navigate_challenge_twice_runs_single_timer() {
    let provider = Arc::new(ScriptedProvider::new(true));
    let browser = RecordingBrowser::with_fragment("#landing");
    let mut router = router(&provider, &browser);

    router.navigate_to(PageId::Challenge).await;
    router.navigate_to(PageId::Challenge).await;
    tokio::time::sleep(Duration::from_millis(3_500)).await;
    tokio::task::yield_now().await;

    assert_eq!(router.active_page(), Some(PageId::Challenge));
    assert_eq!(browser.state().active_view, Some(PageId::Challenge));
    assert_eq!(router.timer().starts(), 2);
    assert_eq!(router.timer().clock().elapsed_secs, 3);
    assert_eq!(router.timer_updates().borrow().to_string(), "00:00:03");
}

#[tokio::test]
async fn test_on_hash_change_keeps_url_untouched() {
    let provider = Arc::new(ScriptedProvider::new(false));
    let browser = RecordingBrowser::with_fragment("#leaderboard");
    let mut router = router(&provider, &browser);

    let outcome = router.on_hash_change().await;

    assert_eq!(outcome, NavigationOutcome::Activated(PageId::Leaderboard));
    assert!(browser.state().replaced.is_empty());
}

#[tokio::test]
async fn test_navigate_missing_view_changes_nothing() {
    let provider = Arc::new(ScriptedProvider::new(false));
    let browser = RecordingBrowser::with_fragment("#landing").without_view(PageId::Leaderboard);
    let mut router = router(&provider, &browser);
    router.start().await;

    let outcome = router.navigate_to(PageId::Leaderboard).await;

    assert_eq!(outcome, NavigationOutcome::MissingView(PageId::Leaderboard));
    assert_eq!(router.active_page(), Some(PageId::Landing));
    let state = browser.state();
    assert_eq!(state.active_view, Some(PageId::Landing));
    assert_eq!(state.fragment, "#landing");
}

// =========================================================================
// Session changes and logout
// =========================================================================

#[tokio::test]
async fn test_on_session_change_signed_out_leaves_protected_page() {
    let provider = Arc::new(ScriptedProvider::new(true));
    let browser = RecordingBrowser::with_fragment("#challenge");
    let mut router = router(&provider, &browser);
    router.start().await;

    let url = router.on_session_change(&AuthStateChange::new(AuthEvent::SignedOut, None));

    assert_eq!(url.as_deref(), Some("login.html?next=challenge"));
    assert_eq!(browser.state().assigned, vec!["login.html?next=challenge"]);
}

#[tokio::test]
async fn test_on_session_change_ignores_public_page_and_sign_in() {
    let provider = Arc::new(ScriptedProvider::new(false));
    let browser = RecordingBrowser::with_fragment("#landing");
    let mut router = router(&provider, &browser);
    router.start().await;

    assert_eq!(
        router.on_session_change(&AuthStateChange::new(AuthEvent::SignedOut, None)),
        None
    );
    router.browser_mut().replace_fragment("#dashboard");
    assert_eq!(
        router.on_session_change(&AuthStateChange::new(
            AuthEvent::SignedIn,
            Some(Session::new("t")),
        )),
        None
    );
    assert!(browser.state().assigned.is_empty());
}

#[tokio::test]
async fn test_logout_with_failing_provider_still_clears_and_redirects() {
    let provider = Arc::new(ScriptedProvider::new(true).failing_sign_out());
    let store = Arc::new(MemoryStore::new("localStorage"));
    store.set("sb-proj-auth-token", "token").unwrap();
    store.set("supabase.auth.token", "legacy").unwrap();
    store.set("ctf-theme", "matrix").unwrap();
    let gateway = SessionGateway::new(Arc::clone(&provider))
        .with_store(Arc::clone(&store) as Arc<dyn KeyValueStore>);
    let browser = RecordingBrowser::with_fragment("#dashboard");
    let mut router = Router::new(gateway, browser.clone(), RouterConfig::default());

    let url = router.logout().await;

    assert_eq!(url, "login.html");
    assert_eq!(browser.state().assigned, vec!["login.html"]);
    assert_eq!(store.keys().unwrap(), vec!["ctf-theme".to_string()]);
}

#[tokio::test]
async fn test_on_session_change_after_logout_does_not_redirect_again() {
    let provider = Arc::new(ScriptedProvider::new(true));
    let browser = RecordingBrowser::with_fragment("#dashboard");
    let mut router = router(&provider, &browser);
    router.start().await;

    router.logout().await;
    let url = router.on_session_change(&AuthStateChange::new(AuthEvent::SignedOut, None));

    assert_eq!(url, None);
    assert!(router.has_left());
    assert_eq!(browser.state().assigned, vec!["login.html"]);
}

// =========================================================================
// Router actor
// =========================================================================

async fn wait_for_assign(browser: &RecordingBrowser) -> Vec<String> {
    for _ in 0..100 {
        if !browser.state().assigned.is_empty() {
            break;
        }
        tokio::task::yield_now().await;
    }
    browser.state().assigned.clone()
}

#[tokio::test]
async fn test_spawned_router_redirects_when_session_expires() {
    let provider = Arc::new(
        MemoryIdentityProvider::new().with_account("neo@example.com", "secret1", "neo"),
    );
    let gateway = SessionGateway::new(Arc::clone(&provider));
    gateway.sign_in("neo@example.com", "secret1").await.unwrap();
    let browser = RecordingBrowser::with_fragment("#landing");
    let (handle, _task) = spawn_router(Router::new(
        gateway,
        browser.clone(),
        RouterConfig::default(),
    ));

    assert_eq!(
        handle.navigate_to(PageId::Dashboard).await.unwrap(),
        NavigationOutcome::Activated(PageId::Dashboard)
    );
    provider.expire_session();

    assert_eq!(
        wait_for_assign(&browser).await,
        vec!["login.html?next=dashboard"]
    );
}

#[tokio::test]
async fn test_spawned_router_hash_change_and_active_page() {
    let provider = Arc::new(ScriptedProvider::new(false));
    let browser = RecordingBrowser::with_fragment("#landing");
    let (handle, _task) = spawn_router(router(&provider, &browser));

    browser.state().fragment = "#leaderboard".to_string();
    assert_eq!(
        handle.hash_changed().await.unwrap(),
        NavigationOutcome::Activated(PageId::Leaderboard)
    );
    assert_eq!(
        handle.active_page().await.unwrap(),
        Some(PageId::Leaderboard)
    );
}

#[tokio::test]
async fn test_spawned_router_logout_redirects() {
    let provider = Arc::new(ScriptedProvider::new(true));
    let browser = RecordingBrowser::with_fragment("#dashboard");
    let (handle, _task) = spawn_router(router(&provider, &browser));

    assert_eq!(handle.logout().await.unwrap(), "login.html");
    assert_eq!(browser.state().assigned, vec!["login.html"]);
}

#[tokio::test]
async fn test_spawned_router_shutdown_returns_router() {
    let provider = Arc::new(ScriptedProvider::new(false));
    let browser = RecordingBrowser::with_fragment("#landing");
    let (handle, task) = spawn_router(router(&provider, &browser));

    handle.navigate_to(PageId::Leaderboard).await.unwrap();
    handle.shutdown().await.unwrap();
    let router = task.await.unwrap();

    assert_eq!(router.active_page(), Some(PageId::Leaderboard));
    assert!(matches!(
        handle.navigate_to(PageId::Landing).await,
        Err(RouterError::Unavailable)
    ));
}

#[tokio::test]
async fn test_spawned_router_start_writes_default_fragment() {
    let provider = Arc::new(ScriptedProvider::new(false));
    let browser = RecordingBrowser::with_fragment("");
    let (handle, _task) = spawn_router(router(&provider, &browser));

    assert_eq!(
        handle.start().await.unwrap(),
        NavigationOutcome::Activated(PageId::Landing)
    );
    assert_eq!(browser.state().fragment, "#landing");
    assert_eq!(handle.active_page().await.unwrap(), Some(PageId::Landing));
}

#[tokio::test]
async fn test_spawned_router_logout_ignores_own_sign_out_event() {
    let provider = Arc::new(
        MemoryIdentityProvider::new().with_account("neo@example.com", "secret1", "neo"),
    );
    let gateway = SessionGateway::new(Arc::clone(&provider));
    gateway.sign_in("neo@example.com", "secret1").await.unwrap();
    let browser = RecordingBrowser::with_fragment("#landing");
    let (handle, _task) = spawn_router(Router::new(
        gateway,
        browser.clone(),
        RouterConfig::default(),
    ));

    assert_eq!(
        handle.navigate_to(PageId::Dashboard).await.unwrap(),
        NavigationOutcome::Activated(PageId::Dashboard)
    );
    assert_eq!(handle.logout().await.unwrap(), "login.html");
    // Give the actor time to receive the provider's SignedOut event.
    for _ in 0..100 {
        tokio::task::yield_now().await;
    }

    assert_eq!(browser.state().assigned, vec!["login.html"]);
}
