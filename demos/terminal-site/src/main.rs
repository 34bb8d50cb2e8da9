use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gdgctf::effects::{MatrixConfig, MatrixRain, StatCounters};
use gdgctf::prelude::*;
use gdgctf::router::{HintToggle, NavMenu, RouterError, navbar_scrolled, spawn_router};
use tokio::io::{AsyncBufReadExt, BufReader};

const DEMO_EMAIL: &str = "neo@gdg.ctf";
const DEMO_PASSWORD: &str = "secret1";
const STAT_TARGETS: [&str; 3] = ["500", "48", "12"];

// ---------------------------------------------------------------------------
// Terminal host: both documents print to stdout and share one location.
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Screen {
    fragment: String,
    pending: Option<String>,
    label: String,
}

#[derive(Clone, Default)]
struct Terminal(Arc<Mutex<Screen>>);

impl Terminal {
    fn screen(&self) -> MutexGuard<'_, Screen> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_pending(&self) -> Option<String> {
        self.screen().pending.take()
    }

    fn go(&self, url: &str) {
        println!("  -> {url}");
        self.screen().pending = Some(url.to_string());
    }
}

impl Browser for Terminal {
    fn has_view(&self, _page: PageId) -> bool {
        true
    }

    fn clear_active(&mut self) {}

    fn activate_view(&mut self, page: PageId) {
        println!("==================== {page} ====================");
    }

    fn highlight_links(&mut self, _page: PageId) {}

    fn close_nav_menu(&mut self) {}

    fn replace_fragment(&mut self, fragment: &str) {
        self.screen().fragment = fragment.to_string();
    }

    fn scroll_to_top(&mut self) {}

    fn current_fragment(&self) -> String {
        self.screen().fragment.clone()
    }

    fn assign(&mut self, url: &str) {
        self.go(url);
    }
}

impl AuthPage for Terminal {
    fn show_status(&mut self, message: &StatusMessage) {
        println!("  {message}");
    }

    fn submit_label(&self) -> String {
        self.screen().label.clone()
    }

    fn set_submit(&mut self, enabled: bool, label: &str) {
        let state = if enabled { "" } else { " (disabled)" };
        println!("  {label}{state}");
        self.screen().label = label.to_string();
    }

    fn reset_form(&mut self) {}

    fn assign(&mut self, url: &str) {
        self.go(url);
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
enum Command {
    Goto(String),
    Hash(String),
    Login { email: String, password: String },
    Register { name: String, email: String, password: String, confirm: String },
    Confirm(String),
    Logout,
    Expire,
    Flag(String),
    Hint,
    Menu,
    Scroll(f64),
    Timer,
    Stats,
    Matrix,
    Typing,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Err("empty command".into());
    };
    let args: Vec<&str> = words.collect();
    let arg = |i: usize| args.get(i).map(|s| s.to_string()).unwrap_or_default();

    let command = match name {
        "goto" => Command::Goto(arg(0)),
        "hash" => Command::Hash(arg(0)),
        "login" if args.len() == 2 => Command::Login { email: arg(0), password: arg(1) },
        "register" if args.len() == 4 => Command::Register {
            name: arg(0),
            email: arg(1),
            password: arg(2),
            confirm: arg(3),
        },
        "confirm" => Command::Confirm(arg(0)),
        "logout" => Command::Logout,
        "expire" => Command::Expire,
        "flag" => Command::Flag(args.join(" ")),
        "hint" => Command::Hint,
        "menu" => Command::Menu,
        "scroll" => Command::Scroll(arg(0).parse().map_err(|_| "scroll <pixels>")?),
        "timer" => Command::Timer,
        "stats" => Command::Stats,
        "matrix" => Command::Matrix,
        "typing" => Command::Typing,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "login" => return Err("usage: login <email> <password>".into()),
        "register" => return Err("usage: register <name> <email> <password> <confirm>".into()),
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(command)
}

const HELP: &str = "\
  goto <page>                 follow a link (landing, dashboard, challenge, leaderboard)
  hash <#page>                edit the address bar fragment
  login <email> <password>    submit the login form
  register <name> <email> <password> <confirm>
  confirm <email>             click the emailed confirmation link
  logout | expire             end the session locally or on the provider
  flag <text>                 submit to the challenge terminal
  hint | menu | scroll <px>   page chrome
  timer | stats | matrix | typing
  quit";

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

/// Yields so the router task can handle pending session events, then
/// round-trips a command through it.
async fn settle(handle: &RouterHandle) -> Result<(), RouterError> {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
    handle.active_page().await.map(|_| ())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    gdgctf::init_tracing().ok();

    let config = match std::env::args().nth(1) {
        Some(path) => SiteConfig::from_json(&tokio::fs::read_to_string(path).await?)?,
        None => SiteConfig::default(),
    };
    let project_ref = config.provider.project_ref().unwrap_or("local").to_string();
    if config.provider.is_configured() {
        tracing::info!(
            url = %config.provider.url,
            "hosted provider configured; demo still uses in-memory accounts"
        );
    } else {
        tracing::info!("no hosted provider configured; using in-memory accounts");
    }

    let local_storage = Arc::new(MemoryStore::new("localStorage"));
    let provider = Arc::new(
        MemoryIdentityProvider::new()
            .project_ref(project_ref)
            .with_store(local_storage.clone())
            .with_account(DEMO_EMAIL, DEMO_PASSWORD, "neo"),
    );
    let site = Site::builder()
        .config(config)
        .provider(Arc::clone(&provider))
        .store(local_storage)
        .store(Arc::new(MemoryStore::new("sessionStorage")))
        .build()?;

    let terminal = Terminal::default();
    let router = site.router(terminal.clone());
    let clock = router.timer_updates();
    let (handle, _router_task) = spawn_router(router);

    let mut flag = site.flag_terminal();
    let mut counters = StatCounters::new();
    let mut hint = HintToggle::default();
    let mut menu = NavMenu::default();
    let mut login_query = String::new();

    println!("GDG CTF terminal site. Demo account: {DEMO_EMAIL} / {DEMO_PASSWORD}. Type `help`.");
    handle.start().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("  {e}");
                continue;
            }
        };

        match command {
            Command::Goto(target) => {
                let request = NavigationRequest::new(Some(&target), NavOrigin::Link);
                handle.navigate(request).await?;
            }
            Command::Hash(fragment) => {
                terminal.screen().fragment = fragment;
                handle.hash_changed().await?;
            }
            Command::Login { email, password } => {
                terminal.screen().label = "[ LOGIN ]".to_string();
                let mut auth = site.auth_flow(terminal.clone(), &login_query);
                if let StartOutcome::ShowForm = auth.start().await {
                    auth.submit(&FormFields::login(email, password)).await;
                }
            }
            Command::Register { name, email, password, confirm } => {
                terminal.screen().label = "[ REGISTER ]".to_string();
                let mut auth = site.auth_flow(terminal.clone(), "");
                if let StartOutcome::ShowForm = auth.start().await {
                    auth.submit(&FormFields::register(name, email, password, confirm))
                        .await;
                }
            }
            Command::Confirm(email) => {
                let confirmed = provider.confirm_email(&email);
                println!("  {}", if confirmed { "email confirmed" } else { "no such account" });
            }
            Command::Logout => {
                handle.logout().await?;
            }
            Command::Expire => {
                provider.expire_session();
                settle(&handle).await?;
            }
            Command::Flag(input) => {
                if let Err(e) = flag.submit(&input).await {
                    tracing::debug!(error = %e, "flag not checked");
                }
                if let Some(last) = flag.lines().last() {
                    println!("  {}", last.text);
                }
            }
            Command::Hint => {
                let open = hint.toggle();
                println!("  hint {}", if open { "shown" } else { "hidden" });
            }
            Command::Menu => {
                let open = menu.toggle();
                println!("  menu {}", if open { "open" } else { "closed" });
            }
            Command::Scroll(y) => {
                println!("  navbar scrolled: {}", navbar_scrolled(y));
            }
            Command::Timer => {
                let now = *clock.borrow();
                let percent = now.progress_percent(site.config().timer.full_bar_secs);
                println!("  {now} ({percent:.1}%)");
            }
            Command::Stats => match counters.start(STAT_TARGETS) {
                Some(animations) => {
                    for mut animation in animations {
                        let mut last = String::new();
                        while let Some(frame) = animation.next_frame() {
                            last = frame;
                        }
                        println!("  {last}");
                    }
                }
                None => println!("  counters already ran"),
            },
            Command::Matrix => {
                let mut rain = MatrixRain::new(560, 280, MatrixConfig::default());
                let mut rng = rand::rng();
                for _ in 0..3 {
                    let row: String = rain.step(&mut rng).iter().map(|g| g.ch).collect();
                    println!("  {row}");
                }
            }
            Command::Typing => {
                let mut typing = site.typing_effect();
                let frames: Vec<String> = (0..12).map(|_| typing.tick().text).collect();
                println!("  {}", frames.join(" | "));
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }

        // Follow full-page navigations.
        while let Some(url) = terminal.take_pending() {
            if let Some((_, query)) = url.split_once('?') {
                login_query = query.to_string();
                println!("  [login page] use `login <email> <password>`");
            } else if let Some((_, fragment)) = url.split_once('#') {
                terminal.screen().fragment = format!("#{fragment}");
                handle.hash_changed().await?;
            } else {
                login_query.clear();
                println!("  [login page]");
            }
        }
    }

    handle.shutdown().await?;
    Ok(())
}
