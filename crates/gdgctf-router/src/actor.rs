//! Router actor: the router running in its own Tokio task.
//!
//! UI events (initial load, link clicks, fragment changes, logout) arrive as commands on
//! an mpsc channel. Session changes arrive on the provider's broadcast
//! subscription, which the actor holds for its whole lifetime. Both are
//! handled one at a time in a single `select!` loop, so a navigation and a
//! session-change redirect can never interleave; whichever runs last wins.

use gdgctf_pages::{NavigationRequest, PageId};
use gdgctf_session::IdentityProvider;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{mpsc, oneshot};

use crate::{Browser, NavigationOutcome, Router, RouterError};

/// Default command channel size.
const DEFAULT_CHANNEL_SIZE: usize = 32;

pub(crate) enum RouterCommand {
    Start {
        reply: oneshot::Sender<NavigationOutcome>,
    },
    Navigate {
        request: NavigationRequest,
        reply: oneshot::Sender<NavigationOutcome>,
    },
    HashChanged {
        reply: oneshot::Sender<NavigationOutcome>,
    },
    Logout {
        reply: oneshot::Sender<String>,
    },
    ActivePage {
        reply: oneshot::Sender<Option<PageId>>,
    },
    Shutdown,
}

/// Handle to a running router. Cheap to clone.
#[derive(Clone)]
pub struct RouterHandle {
    sender: mpsc::Sender<RouterCommand>,
}

impl RouterHandle {
    /// Shows the page named by the current fragment and writes the resolved
    /// fragment back to the address bar. Call once after spawning.
    pub async fn start(&self) -> Result<NavigationOutcome, RouterError> {
        self.request(|reply| RouterCommand::Start { reply }).await
    }

    /// Runs a navigation and waits for its outcome.
    pub async fn navigate(
        &self,
        request: NavigationRequest,
    ) -> Result<NavigationOutcome, RouterError> {
        self.request(|reply| RouterCommand::Navigate { request, reply })
            .await
    }

    pub async fn navigate_to(&self, page: PageId) -> Result<NavigationOutcome, RouterError> {
        self.navigate(NavigationRequest::to_page(page)).await
    }

    /// Tells the router the browser changed the fragment.
    pub async fn hash_changed(&self) -> Result<NavigationOutcome, RouterError> {
        self.request(|reply| RouterCommand::HashChanged { reply })
            .await
    }

    /// Signs out; returns the login URL the browser was sent to.
    pub async fn logout(&self) -> Result<String, RouterError> {
        self.request(|reply| RouterCommand::Logout { reply }).await
    }

    pub async fn active_page(&self) -> Result<Option<PageId>, RouterError> {
        self.request(|reply| RouterCommand::ActivePage { reply })
            .await
    }

    /// Stops the router task.
    pub async fn shutdown(&self) -> Result<(), RouterError> {
        self.sender
            .send(RouterCommand::Shutdown)
            .await
            .map_err(|_| RouterError::Unavailable)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RouterCommand,
    ) -> Result<T, RouterError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RouterError::Unavailable)?;
        reply_rx.await.map_err(|_| RouterError::Unavailable)
    }
}

/// Spawns the router. Returns the command handle and the task handle,
/// which resolves to the router once it shuts down.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_router<P, B>(
    router: Router<P, B>,
) -> (RouterHandle, tokio::task::JoinHandle<Router<P, B>>)
where
    P: IdentityProvider,
    B: Browser,
{
    let (sender, receiver) = mpsc::channel(DEFAULT_CHANNEL_SIZE);
    let task = tokio::spawn(run(router, receiver));
    (RouterHandle { sender }, task)
}

async fn run<P, B>(
    mut router: Router<P, B>,
    mut commands: mpsc::Receiver<RouterCommand>,
) -> Router<P, B>
where
    P: IdentityProvider,
    B: Browser,
{
    let mut sessions = router.gateway().on_session_change();
    let mut sessions_open = true;
    tracing::info!("router started");

    loop {
        tokio::select! {
            cmd = commands.recv() => {
                let Some(cmd) = cmd else { break };
                match cmd {
                    RouterCommand::Start { reply } => {
                        let _ = reply.send(router.start().await);
                    }
                    RouterCommand::Navigate { request, reply } => {
                        let _ = reply.send(router.navigate(request).await);
                    }
                    RouterCommand::HashChanged { reply } => {
                        let _ = reply.send(router.on_hash_change().await);
                    }
                    RouterCommand::Logout { reply } => {
                        let _ = reply.send(router.logout().await);
                    }
                    RouterCommand::ActivePage { reply } => {
                        let _ = reply.send(router.active_page());
                    }
                    RouterCommand::Shutdown => break,
                }
            }
            change = sessions.recv(), if sessions_open => {
                match change {
                    Ok(change) => {
                        router.on_session_change(&change);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "session events lagged; rechecking session");
                        router.recheck_session().await;
                    }
                    Err(RecvError::Closed) => {
                        tracing::warn!("session subscription closed");
                        sessions_open = false;
                    }
                }
            }
        }
    }

    tracing::info!("router stopped");
    router
}
