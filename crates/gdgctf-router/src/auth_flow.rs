//! Login and registration form handling.
//!
//! One [`AuthFlow`] drives one auth document. The form's mode is decided
//! by which fields it has: a display name plus a confirmation field means
//! registration, email plus password alone means login.
//!
//! The return target is read from the `next` query parameter once, when
//! the flow is built, and only ever leaves this module as a sanitized
//! [`PageId`].

use std::fmt;
use std::time::Duration;

use gdgctf_pages::url::index_url;
use gdgctf_pages::{PageId, ReturnTarget};
use gdgctf_session::{IdentityProvider, SessionGateway, SignUpStatus};

use crate::{AuthFlowError, ValidationError};

const LOGIN_BUSY_LABEL: &str = "[ ACCESSING... ]";
const REGISTER_BUSY_LABEL: &str = "[ INITIALIZING... ]";
const REGISTER_DONE_LABEL: &str = "[ LINK SENT ]";

// ---------------------------------------------------------------------------
// Status messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    /// Terminal-style marker shown before the message.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Info => "[*]",
            Self::Success => "[+]",
            Self::Error => "[!]",
        }
    }
}

/// An inline status line under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub severity: Severity,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.severity.marker(), self.text)
    }
}

// ---------------------------------------------------------------------------
// AuthPage
// ---------------------------------------------------------------------------

/// The auth document's form controls.
pub trait AuthPage: Send + 'static {
    fn show_status(&mut self, message: &StatusMessage);

    /// Current label of the submit control.
    fn submit_label(&self) -> String;

    fn set_submit(&mut self, enabled: bool, label: &str);

    /// Clears every input.
    fn reset_form(&mut self);

    /// Full navigation to another document.
    fn assign(&mut self, url: &str);
}

// ---------------------------------------------------------------------------
// Form fields
// ---------------------------------------------------------------------------

/// Values of the form's inputs. `None` means the input doesn't exist on
/// this document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub confirm_password: Option<String>,
}

impl FormFields {
    pub fn login(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    pub fn register(
        display_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
            display_name: Some(display_name.into()),
            confirm_password: Some(confirm_password.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Login,
    Register,
}

impl FormMode {
    /// Decides the mode from which inputs are present.
    pub fn detect(fields: &FormFields) -> Option<Self> {
        if fields.display_name.is_some() && fields.confirm_password.is_some() {
            Some(Self::Register)
        } else if fields.email.is_some() && fields.password.is_some() {
            Some(Self::Login)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// AuthFlowConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AuthFlowConfig {
    /// Document the flow returns to after login.
    pub index_path: String,
    /// Pause between the success message and the redirect.
    pub redirect_delay: Duration,
    /// Minimum password length in UTF-16 code units.
    pub min_password_len: usize,
    /// Return target used when `next` is missing or invalid.
    pub default_return: PageId,
}

impl Default for AuthFlowConfig {
    fn default() -> Self {
        Self {
            index_path: "index.html".to_string(),
            redirect_delay: Duration::from_millis(700),
            min_password_len: 6,
            default_return: ReturnTarget::DEFAULT,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// No session; the form should be shown.
    ShowForm,
    /// Already signed in; the browser was sent to `url`.
    Redirected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Signed in; the browser was sent to `url`.
    Redirected(String),
    /// The provider accepted the registration. The form is now locked.
    Registered(SignUpStatus),
    /// Shown to the user; the form can be submitted again.
    Failed(AuthFlowError),
    /// The form is locked or has no recognizable fields.
    Ignored,
}

// ---------------------------------------------------------------------------
// AuthFlow
// ---------------------------------------------------------------------------

pub struct AuthFlow<P: IdentityProvider, A: AuthPage> {
    gateway: SessionGateway<P>,
    page: A,
    config: AuthFlowConfig,
    next: PageId,
    locked: bool,
}

impl<P: IdentityProvider, A: AuthPage> AuthFlow<P, A> {
    /// Builds the flow for a document loaded with `query` (the URL search
    /// string, with or without the leading `?`).
    pub fn new(gateway: SessionGateway<P>, page: A, config: AuthFlowConfig, query: &str) -> Self {
        let next = gdgctf_pages::url::next_page(query, config.default_return);
        Self {
            gateway,
            page,
            config,
            next,
            locked: false,
        }
    }

    /// Skips the form when a session already exists.
    pub async fn start(&mut self) -> StartOutcome {
        if self.gateway.get_session().await.is_none() {
            return StartOutcome::ShowForm;
        }
        let url = index_url(&self.config.index_path, self.next);
        tracing::info!(next = %self.next, "already signed in; skipping form");
        self.page.assign(&url);
        self.locked = true;
        StartOutcome::Redirected(url)
    }

    pub async fn submit(&mut self, fields: &FormFields) -> SubmitOutcome {
        if self.locked {
            tracing::debug!("form locked; ignoring submit");
            return SubmitOutcome::Ignored;
        }
        match FormMode::detect(fields) {
            Some(FormMode::Login) => self.login(fields).await,
            Some(FormMode::Register) => self.register(fields).await,
            None => SubmitOutcome::Ignored,
        }
    }

    /// The sanitized return target.
    pub fn next(&self) -> PageId {
        self.next
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn page(&self) -> &A {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut A {
        &mut self.page
    }

    async fn login(&mut self, fields: &FormFields) -> SubmitOutcome {
        let email = field(&fields.email).trim();
        let password = field(&fields.password);
        if let Err(e) = require(email, "email").and_then(|()| require(password, "password")) {
            return self.reject(e.into());
        }

        let original_label = self.begin(LOGIN_BUSY_LABEL, "Authenticating credentials...");

        match self.gateway.sign_in(email, password).await {
            Ok(()) => {
                self.page
                    .show_status(&StatusMessage::success("Access granted. Redirecting..."));
                self.locked = true;
                tokio::time::sleep(self.config.redirect_delay).await;
                let url = index_url(&self.config.index_path, self.next);
                self.page.assign(&url);
                SubmitOutcome::Redirected(url)
            }
            Err(e) => self.fail(e.into(), &original_label),
        }
    }

    async fn register(&mut self, fields: &FormFields) -> SubmitOutcome {
        let display_name = field(&fields.display_name).trim();
        let email = field(&fields.email).trim();
        let password = field(&fields.password);
        let confirm = field(&fields.confirm_password);

        if let Err(e) = self.validate_registration(display_name, email, password, confirm) {
            return self.reject(e.into());
        }

        let original_label = self.begin(REGISTER_BUSY_LABEL, "Creating identity...");

        match self.gateway.sign_up(email, password, display_name).await {
            Ok(status) => {
                self.page.show_status(&StatusMessage::success(
                    "Identity initialized. Check your email.",
                ));
                self.page.reset_form();
                self.page.set_submit(false, REGISTER_DONE_LABEL);
                self.locked = true;
                SubmitOutcome::Registered(status)
            }
            Err(e) => self.fail(e.into(), &original_label),
        }
    }

    fn validate_registration(
        &self,
        display_name: &str,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<(), ValidationError> {
        require(display_name, "username")?;
        require(email, "email")?;
        if password != confirm {
            return Err(ValidationError::PasswordMismatch);
        }
        // Length in UTF-16 code units, as a browser's `String.length` counts.
        if password.encode_utf16().count() < self.config.min_password_len {
            return Err(ValidationError::PasswordTooShort {
                min: self.config.min_password_len,
            });
        }
        Ok(())
    }

    /// Disables the submit control and shows the in-progress status.
    /// Returns the label to restore on failure.
    fn begin(&mut self, busy_label: &str, status: &str) -> String {
        let original = self.page.submit_label();
        self.page.set_submit(false, busy_label);
        self.page.show_status(&StatusMessage::info(status));
        original
    }

    /// Rejection before anything was disabled.
    fn reject(&mut self, err: AuthFlowError) -> SubmitOutcome {
        tracing::debug!(error = %err, "form rejected");
        self.page.show_status(&StatusMessage::error(err.to_string()));
        SubmitOutcome::Failed(err)
    }

    fn fail(&mut self, err: AuthFlowError, original_label: &str) -> SubmitOutcome {
        self.page.show_status(&StatusMessage::error(err.to_string()));
        self.page.set_submit(true, original_label);
        SubmitOutcome::Failed(err)
    }
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

fn require(value: &str, name: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::MissingField(name))
    } else {
        Ok(())
    }
}
