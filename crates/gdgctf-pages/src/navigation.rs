//! Navigation requests and return targets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{PageId, sanitize};

/// Where a navigation attempt came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavOrigin {
    /// Page load: the fragment present when the site started.
    Initial,
    /// A `.nav-link` click (`data-page` attribute).
    Link,
    /// Any element carrying a `data-navigate` attribute.
    Button,
    /// The browser changed the fragment (back/forward, manual edit).
    HashChange,
    /// A redirect into the site, e.g. after login.
    Redirect,
    /// A direct call from code.
    Programmatic,
}

impl fmt::Display for NavOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initial => "initial",
            Self::Link => "link",
            Self::Button => "button",
            Self::HashChange => "hash_change",
            Self::Redirect => "redirect",
            Self::Programmatic => "programmatic",
        };
        f.write_str(name)
    }
}

/// A single attempt to move to a page.
///
/// The target is kept as the raw, unvalidated string the host handed over.
/// The router sanitizes it as the first step of the transition, so there is
/// no way to build a request that skips validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    /// The requested page name, exactly as supplied.
    pub target: Option<String>,
    /// What triggered the attempt.
    pub origin: NavOrigin,
    /// Whether the fragment should be rewritten to the final page.
    pub update_url: bool,
}

impl NavigationRequest {
    /// A request that rewrites the fragment on success.
    pub fn new(target: Option<&str>, origin: NavOrigin) -> Self {
        Self {
            target: target.map(str::to_owned),
            origin,
            update_url: true,
        }
    }

    /// A request to a known page from code.
    pub fn to_page(page: PageId) -> Self {
        Self::new(Some(page.as_str()), NavOrigin::Programmatic)
    }

    /// A request triggered by the browser's own fragment change.
    ///
    /// The address bar already shows the fragment, so it is not rewritten.
    pub fn from_hash_change(fragment: &str) -> Self {
        Self {
            target: Some(crate::url::strip_fragment(fragment).to_owned()),
            origin: NavOrigin::HashChange,
            update_url: false,
        }
    }

    /// Overrides whether the fragment is rewritten.
    pub fn with_update_url(mut self, update_url: bool) -> Self {
        self.update_url = update_url;
        self
    }

    /// The validated target page.
    pub fn resolve(&self, fallback: PageId) -> PageId {
        sanitize(self.target.as_deref(), fallback)
    }
}

/// The page to come back to after logging in.
///
/// Always a known page: it can only be built through [`ReturnTarget::parse`]
/// or from an existing [`PageId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnTarget(PageId);

impl ReturnTarget {
    /// Page used when `next` is missing or invalid.
    pub const DEFAULT: PageId = PageId::Dashboard;

    /// Sanitizes a raw `next` value, defaulting to the dashboard.
    pub fn parse(raw: Option<&str>) -> Self {
        Self(sanitize(raw, Self::DEFAULT))
    }

    /// Reads and sanitizes `next` from a query string.
    pub fn from_query(query: &str) -> Self {
        Self(crate::url::next_page(query, Self::DEFAULT))
    }

    /// The target page.
    pub fn page(self) -> PageId {
        self.0
    }
}

impl From<PageId> for ReturnTarget {
    fn from(page: PageId) -> Self {
        Self(page)
    }
}

impl Default for ReturnTarget {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for ReturnTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
