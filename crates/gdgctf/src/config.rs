//! Site configuration.
//!
//! Every field has a default matching the live site, so an empty JSON
//! object is a valid config.

use std::time::Duration;

use gdgctf_effects::{ChallengeTimerConfig, FlagConfig};
use gdgctf_pages::{PageId, PageRegistry, ReturnTarget};
use gdgctf_router::{AuthFlowConfig, RouterConfig};
use gdgctf_session::AuthStorageConfig;
use serde::{Deserialize, Serialize};

/// Longest redirect pause `validated()` lets through.
const MAX_REDIRECT_DELAY_MS: u64 = 10_000;

/// Errors loading a [`SiteConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid site config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Hosted identity provider connection details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Project URL, e.g. `https://<ref>.supabase.co`.
    pub url: String,
    /// Public (anon) API key. Safe to ship to the browser.
    pub anon_key: String,
}

impl ProviderConfig {
    /// `true` when both the project URL and the anon key are set.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }

    /// Project reference: the first host label of `url`.
    ///
    /// ```
    /// use gdgctf::ProviderConfig;
    ///
    /// let provider = ProviderConfig {
    ///     url: "https://abcd.supabase.co".into(),
    ///     anon_key: String::new(),
    /// };
    /// assert_eq!(provider.project_ref(), Some("abcd"));
    /// ```
    pub fn project_ref(&self) -> Option<&str> {
        let rest = self.url.trim();
        let rest = rest.split_once("://").map_or(rest, |(_, host)| host);
        let host = rest.split(['/', ':']).next()?;
        host.split('.').next().filter(|label| !label.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub index_path: String,
    pub login_path: String,
    /// Shown for unknown or missing fragments.
    pub default_page: PageId,
    /// Post-login target when `next` is missing or invalid.
    pub default_return_page: PageId,
    /// Pages that require a session.
    pub protected_pages: Vec<PageId>,
    pub redirect_delay_ms: u64,
    pub min_password_len: usize,
    pub auth_storage: AuthStorageConfig,
    pub timer: ChallengeTimerConfig,
    pub flag: FlagConfig,
    pub provider: ProviderConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            index_path: "index.html".to_string(),
            login_path: "login.html".to_string(),
            default_page: PageId::Landing,
            default_return_page: ReturnTarget::DEFAULT,
            protected_pages: PageRegistry::default().protected().to_vec(),
            redirect_delay_ms: 700,
            min_password_len: 6,
            auth_storage: AuthStorageConfig::default(),
            timer: ChallengeTimerConfig::default(),
            flag: FlagConfig::default(),
            provider: ProviderConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Parses a JSON config. Missing fields take their defaults.
    ///
    /// # Errors
    /// [`ConfigError::Parse`] on malformed JSON or mistyped fields.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Clamps out-of-range values, logging each correction.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        if self.index_path.trim().is_empty() {
            tracing::warn!(default = %defaults.index_path, "empty index_path; using default");
            self.index_path = defaults.index_path;
        }
        if self.login_path.trim().is_empty() {
            tracing::warn!(default = %defaults.login_path, "empty login_path; using default");
            self.login_path = defaults.login_path;
        }
        if self.min_password_len == 0 {
            tracing::warn!("min_password_len of 0 raised to 1");
            self.min_password_len = 1;
        }
        if self.redirect_delay_ms > MAX_REDIRECT_DELAY_MS {
            tracing::warn!(
                redirect_delay_ms = self.redirect_delay_ms,
                max = MAX_REDIRECT_DELAY_MS,
                "redirect delay clamped"
            );
            self.redirect_delay_ms = MAX_REDIRECT_DELAY_MS;
        }
        if self.timer.period_ms == 0 {
            tracing::warn!("timer period of 0 ms raised to 1 ms");
            self.timer.period_ms = 1;
        }
        if self.timer.full_bar_secs == 0 {
            tracing::warn!(
                default = defaults.timer.full_bar_secs,
                "timer full_bar_secs of 0; using default"
            );
            self.timer.full_bar_secs = defaults.timer.full_bar_secs;
        }
        if self.flag.answer.trim().is_empty() {
            tracing::warn!("empty flag answer; using default");
            self.flag.answer = defaults.flag.answer;
        }
        if self.provider.url.trim().is_empty() {
            tracing::debug!("no provider url configured");
        } else if self.provider.anon_key.trim().is_empty() {
            tracing::warn!(url = %self.provider.url, "provider url set without anon_key");
        }

        self
    }

    pub fn registry(&self) -> PageRegistry {
        PageRegistry::new(self.protected_pages.iter().copied())
    }

    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            index_path: self.index_path.clone(),
            login_path: self.login_path.clone(),
            default_page: self.default_page,
            registry: self.registry(),
            timer: self.timer.clone(),
        }
    }

    pub fn auth_flow_config(&self) -> AuthFlowConfig {
        AuthFlowConfig {
            index_path: self.index_path.clone(),
            redirect_delay: Duration::from_millis(self.redirect_delay_ms),
            min_password_len: self.min_password_len,
            default_return: self.default_return_page,
        }
    }
}
